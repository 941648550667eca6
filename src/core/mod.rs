/// Reminder email rendering
pub mod digest;
/// Subscription add/edit form state machine
pub mod form;
/// Optimistic update helper
pub mod optimistic;
/// Profile and reminder preference operations
pub mod profile;
/// Reminder selection and the daily batch
pub mod reminder;
/// Per-user sessions tying local state to the store
pub mod session;
/// Application state and reducer
pub mod state;
/// Expiry status classification
pub mod status;
/// Subscription CRUD operations
pub mod subscription;
/// Counts, urgent list and search
pub mod summary;
