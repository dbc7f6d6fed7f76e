//! Results email: HTML rendering and delivery through the Resend API.

mod resend;
mod template;

pub use resend::{MailError, ResendClient};
pub use template::{escape_html, render_results_email, score_color, subject_line};
