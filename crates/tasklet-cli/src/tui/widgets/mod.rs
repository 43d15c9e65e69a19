pub mod add_task;
pub mod intro_text;
pub mod login;
pub mod task_list;

pub use add_task::AddTaskWidget;
pub use intro_text::IntroTextWidget;
pub use login::{LoginForm, LoginWidget};
pub use task_list::TaskListWidget;
