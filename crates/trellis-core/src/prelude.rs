pub use crate::binding::{BindTarget, BroadcastBridge, Decomposed, EventBridge, MemberExpr, NoBridge};
pub use crate::broadcast::{FieldChannel, PropBroadcast, object_key};
pub use crate::color::Color;
pub use crate::error::BindError;
pub use crate::observable::{Handler, Observable, Property, SubId, Subscription, property};
pub use crate::style::{AssembledStyles, FW_BOLD, FW_NORMAL, FontFlags, StyleProp};
pub use crate::text::{MultiString, StyledSegment, StyledText};
pub use crate::units::{Mp, Thickness, Units, Ws};
