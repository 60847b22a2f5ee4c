use std::collections::BTreeMap;

use crate::{StyleProp, Ws};

/// Text made of differently styled segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyledText {
    segments: Vec<StyledSegment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub props: Vec<StyleProp>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new().with(text, [])
    }
    pub fn with(mut self, text: impl Into<String>, props: impl IntoIterator<Item = StyleProp>) -> Self {
        self.segments.push(StyledSegment {
            text: text.into(),
            props: props.into_iter().collect(),
        });
        self
    }
    pub fn segments(&self) -> &[StyledSegment] {
        &self.segments
    }
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// One string per writing system.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiString {
    alternatives: BTreeMap<Ws, String>,
}

impl MultiString {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, ws: Ws, text: impl Into<String>) -> Self {
        self.set(ws, text);
        self
    }
    pub fn set(&mut self, ws: Ws, text: impl Into<String>) {
        self.alternatives.insert(ws, text.into());
    }
    pub fn get(&self, ws: Ws) -> Option<&str> {
        self.alternatives.get(&ws).map(String::as_str)
    }
    /// The alternative for `ws`, or the empty string.
    pub fn alternative(&self, ws: Ws) -> &str {
        self.get(ws).unwrap_or("")
    }
    pub fn writing_systems(&self) -> impl Iterator<Item = Ws> + '_ {
        self.alternatives.keys().copied()
    }
}
