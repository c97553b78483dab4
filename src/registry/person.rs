use serde::{Deserialize, Serialize};

/// The stored person. `senior` is not a field: it is always derived from
/// `age`, so the two can never disagree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
    pub name: String,
    pub age: u32,
    pub height: u32,
}

impl PersonRecord {
    pub fn is_senior(&self, senior_age: u32) -> bool {
        self.age >= senior_age
    }

    pub fn view(&self, senior_age: u32) -> PersonView {
        PersonView {
            name: self.name.clone(),
            age: self.age,
            height: self.height,
            senior: self.is_senior(senior_age),
        }
    }
}

/// What `getPerson` returns. The default value is the zero record
/// reported for an empty slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonView {
    pub name: String,
    pub age: u32,
    pub height: u32,
    pub senior: bool,
}
