//! Offline medicine lookup over a small built-in sample list.

use serde::{Deserialize, Serialize};

pub const MEDICINE_DISCLAIMER: &str = "This information is for educational purposes only. \
Always consult with a qualified healthcare professional or pharmacist before taking any medication. \
Do not use this information as a substitute for professional medical advice.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    pub usage: String,
    pub precautions: Vec<String>,
}

impl Medicine {
    fn new(name: &str, usage: &str, precautions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            precautions: precautions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// First `max_chars` of the usage text, for card previews.
    pub fn usage_preview(&self, max_chars: usize) -> String {
        if self.usage.chars().count() <= max_chars {
            return self.usage.clone();
        }
        let cut: String = self.usage.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

pub struct MedicineCatalog {
    medicines: Vec<Medicine>,
}

impl Default for MedicineCatalog {
    fn default() -> Self {
        Self::sample()
    }
}

impl MedicineCatalog {
    pub fn new(medicines: Vec<Medicine>) -> Self {
        Self { medicines }
    }

    pub fn sample() -> Self {
        Self::new(vec![
            Medicine::new(
                "Paracetamol",
                "Paracetamol is used to relieve mild to moderate pain and reduce fever. It is commonly used for \
headaches, muscle aches, arthritis, backaches, toothaches, colds, and fevers.",
                &[
                    "Do not exceed the recommended dosage",
                    "Avoid alcohol while taking this medication",
                    "Consult a doctor if symptoms persist for more than 3 days",
                    "Not recommended for children under 2 years without medical supervision",
                    "Inform your doctor if you have liver or kidney problems",
                ],
            ),
            Medicine::new(
                "Ibuprofen",
                "Ibuprofen is a nonsteroidal anti-inflammatory drug (NSAID) used to reduce inflammation, pain, and \
fever. It is commonly used for conditions like arthritis, menstrual cramps, and minor injuries.",
                &[
                    "Take with food or milk to reduce stomach upset",
                    "Do not use if you have a history of stomach ulcers",
                    "Avoid prolonged use without medical supervision",
                    "May increase risk of heart attack or stroke",
                    "Consult a doctor before use if you have heart, kidney, or liver conditions",
                ],
            ),
            Medicine::new(
                "Amoxicillin",
                "Amoxicillin is an antibiotic used to treat various bacterial infections including respiratory \
infections, ear infections, urinary tract infections, and skin infections.",
                &[
                    "Complete the full course even if you feel better",
                    "Do not share this medication with others",
                    "Inform your doctor if you have allergies to penicillin",
                    "May cause diarrhea - consult doctor if severe",
                    "Take at regular intervals as prescribed",
                ],
            ),
        ])
    }

    pub fn all(&self) -> &[Medicine] {
        &self.medicines
    }

    /// Case-insensitive substring match on the medicine name.
    pub fn search(&self, query: &str) -> Vec<&Medicine> {
        let query_lower = query.trim().to_lowercase();

        self.medicines
            .iter()
            .filter(|medicine| medicine.name.to_lowercase().contains(&query_lower))
            .collect()
    }
}

/// What the medicine screen should show.
#[derive(Debug, PartialEq, Eq)]
pub enum SearchView<'a> {
    /// Nothing searched yet: show the popular list.
    Popular(&'a [Medicine]),
    Results(&'a [Medicine]),
    NoResults { query: &'a str },
}

/// Search box state on top of a catalog.
pub struct MedicineSearch {
    catalog: MedicineCatalog,
    query: String,
    results: Vec<Medicine>,
    has_searched: bool,
}

impl MedicineSearch {
    pub fn new(catalog: MedicineCatalog) -> Self {
        Self {
            catalog,
            query: String::new(),
            results: Vec::new(),
            has_searched: false,
        }
    }

    /// Runs a search. Blank queries are ignored and return false.
    pub fn submit(&mut self, query: &str) -> bool {
        if query.trim().is_empty() {
            return false;
        }
        self.query = query.trim().to_string();
        self.results = self.catalog.search(&self.query).into_iter().cloned().collect();
        self.has_searched = true;
        tracing::debug!(query = %self.query, found = self.results.len(), "medicine search");
        true
    }

    /// Shows a single medicine as if it had been searched for.
    pub fn show(&mut self, medicine: &Medicine) {
        self.query = medicine.name.clone();
        self.results = vec![medicine.clone()];
        self.has_searched = true;
    }

    /// Replaces results with ones fetched elsewhere, e.g. from the backend.
    pub fn set_results(&mut self, query: &str, results: Vec<Medicine>) {
        self.query = query.trim().to_string();
        self.results = results;
        self.has_searched = true;
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.has_searched = false;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn catalog(&self) -> &MedicineCatalog {
        &self.catalog
    }

    pub fn view(&self) -> SearchView<'_> {
        if !self.has_searched {
            SearchView::Popular(self.catalog.all())
        } else if self.results.is_empty() {
            SearchView::NoResults { query: &self.query }
        } else {
            SearchView::Results(&self.results)
        }
    }
}
