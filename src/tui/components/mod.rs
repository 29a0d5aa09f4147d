// Components module - shell pieces rendered around every view
//
// - Title bar: app name, screen tabs, signed-in user
// - Status bar: board counters and key hints
// - Logs panel: tail of the in-memory log buffer
// - Toast: transient notices on top of everything

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
