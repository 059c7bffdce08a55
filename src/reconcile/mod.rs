pub mod changes;
pub mod reconciler;
