/// Ordered assertion inputs as the user typed them. Expressions are opaque;
/// the backend evaluates them and reports syntax errors per assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFields {
    fields: Vec<String>,
}

impl Default for AssertionFields {
    fn default() -> Self {
        Self::new()
    }
}

impl AssertionFields {
    /// Starts with one empty field.
    pub fn new() -> Self {
        Self {
            fields: vec![String::new()],
        }
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: texts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn add(&mut self) {
        self.fields.push(String::new());
    }

    pub fn remove(&mut self, index: usize) -> bool {
        if index < self.fields.len() {
            self.fields.remove(index);
            true
        } else {
            false
        }
    }

    pub fn edit(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                *field = text.into();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed, non-empty expressions in field order. Duplicates are kept.
    pub fn collect(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }
}
