use std::collections::BTreeMap;

/// The values recorded at the end of every epoch, by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    values: BTreeMap<String, Vec<f32>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str, value: f32) {
        self.values.entry(name.to_string()).or_default().push(value);
    }

    /// Returns every recorded value for `name`, oldest first.
    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Returns the value `name` had at the end of the last epoch.
    pub fn last(&self, name: &str) -> Option<f32> {
        self.get(name)?.last().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the amount of epochs recorded.
    pub fn epochs(&self) -> usize {
        self.get("loss").map(<[f32]>::len).unwrap_or_default()
    }
}
