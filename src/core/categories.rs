//! Keyword based grouping of tests into categories for the test selector.
//!
//! Each test name is lowercased and checked against every category's keyword
//! substrings in table order. The first category with a match wins, so a test
//! never lands in two categories. Tests matching nothing go to "Other".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::AllResults;

pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered category to keyword table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Keywords are lowercased. An entry named "Other" is ignored; the
    /// catch-all is always present and always last.
    pub fn new(categories: Vec<Category>) -> Self {
        let categories = categories
            .into_iter()
            .filter(|category| category.name != OTHER_CATEGORY)
            .map(|category| Category {
                name: category.name,
                keywords: category.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn classify(&self, test_name: &str) -> &str {
        let lower = test_name.to_lowercase();
        self.categories
            .iter()
            .find(|category| category.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|category| category.name.as_str())
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Category name to test names, in table order with "Other" last.
    /// Empty categories are omitted.
    pub fn categorize(&self, data: &AllResults) -> IndexMap<String, Vec<String>> {
        let mut grouped: IndexMap<String, Vec<String>> = self
            .categories
            .iter()
            .map(|category| (category.name.clone(), Vec::new()))
            .collect();
        grouped.insert(OTHER_CATEGORY.to_string(), Vec::new());

        for test in &data.tests {
            let category = self.classify(&test.name).to_string();
            grouped.entry(category).or_default().push(test.name.clone());
        }

        grouped.retain(|_, tests| !tests.is_empty());
        grouped
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            Category::new("Diabetes", &["hba1c", "glucose", "insulin", "fructosamine", "c-peptide", "diabetes"]),
            Category::new("Lipids", &["cholesterol", "triglyceride", "lipoprotein", "apob", "apolipoprotein"]),
            Category::new(
                "Kidney",
                &["creatinine", "egfr", "albumin", "urea", "uric acid", "microalbumin", "cystatin", "kidney", "renal"],
            ),
            Category::new("Thyroid", &["thyroid", "thyroxine", "triiodothyronine", "thyroglobulin", "tpo antibody"]),
            Category::new(
                "Liver",
                &[
                    "transaminase",
                    "alanine aminotransferase",
                    "aspartate aminotransferase",
                    "alkaline phosphatase",
                    "bilirubin",
                    "gamma gt",
                    "albumin",
                    "liver",
                    "hepatic",
                ],
            ),
            Category::new(
                "Blood Count",
                &["hemoglobin", "hematocrit", "platelet", "neutrophil", "lymphocyte", "monocyte", "eosinophil", "basophil"],
            ),
            Category::new(
                "Electrolytes",
                &["sodium", "potassium", "chloride", "calcium", "magnesium", "phosphate", "bicarbonate"],
            ),
            Category::new("Iron", &["iron", "ferritin", "transferrin", "tibc", "saturation"]),
            Category::new("Inflammation", &["c-reactive protein", "sedimentation", "fibrinogen"]),
            Category::new("Vitamins", &["vitamin", "folate", "folic acid", "b12", "cobalamin", "vitamin d", "25-oh"]),
            Category::new(
                "Hormones",
                &["testosterone", "estrogen", "estradiol", "progesterone", "cortisol", "prolactin", "dhea", "androgen"],
            ),
        ])
    }
}

pub fn get_test_categories(data: &AllResults, table: &CategoryTable) -> IndexMap<String, Vec<String>> {
    table.categorize(data)
}
