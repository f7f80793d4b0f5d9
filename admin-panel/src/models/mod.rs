pub mod dashboard;
pub mod notice;
pub mod page;
pub mod session;

pub use dashboard::DashboardStats;
pub use notice::{Notice, NoticeKind};
pub use page::Page;
pub use session::{Role, RoleEntry, Session};
