//! UI Components
//!
//! Leptos components for the dashboard and the sign-in screens.

mod board_column;
mod clinic_profile;
mod confirm_button;
mod kanban_board;
mod lead_card;
mod login_form;
mod operating_hours;
mod reset_password_confirm;
mod reset_password_form;
mod sidebar;
mod toast_stack;
mod toggle;
mod whatsapp_channels;

pub use board_column::BoardColumn;
pub use clinic_profile::ClinicProfilePanel;
pub use confirm_button::ConfirmButton;
pub use kanban_board::KanbanBoard;
pub use lead_card::LeadCard;
pub use login_form::LoginForm;
pub use operating_hours::OperatingHoursPanel;
pub use reset_password_confirm::ResetPasswordConfirm;
pub use reset_password_form::ResetPasswordForm;
pub use sidebar::Sidebar;
pub use toast_stack::ToastStack;
pub use toggle::Toggle;
pub use whatsapp_channels::WhatsAppChannels;
