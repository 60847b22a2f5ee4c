use std::rc::Rc;

use trellis_core::{AssembledStyles, EventBridge, NoBridge, StyleProp, Ws};

/// Settings a [`crate::RootView`] is created with.
#[derive(Clone)]
pub struct ViewConfig {
    /// Applied, in order, over the default root style.
    pub base_style: Vec<StyleProp>,
    /// Writing system of text that names none.
    pub default_ws: Ws,
    /// Source of change channels for members without their own.
    pub bridge: Rc<dyn EventBridge>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            base_style: Vec::new(),
            default_ws: Ws::default(),
            bridge: Rc::new(NoBridge),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, prop: StyleProp) -> Self {
        self.base_style.push(prop);
        self
    }

    pub fn with_default_ws(mut self, ws: Ws) -> Self {
        self.default_ws = ws;
        self
    }

    pub fn with_bridge(mut self, bridge: impl EventBridge + 'static) -> Self {
        self.bridge = Rc::new(bridge);
        self
    }

    pub fn root_style(&self) -> Rc<AssembledStyles> {
        AssembledStyles::root()
            .with_ws(self.default_ws)
            .derive_all(&self.base_style)
    }
}

impl std::fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewConfig")
            .field("base_style", &self.base_style)
            .field("default_ws", &self.default_ws)
            .finish_non_exhaustive()
    }
}
