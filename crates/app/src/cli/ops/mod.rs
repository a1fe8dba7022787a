pub mod board;
pub mod fetch;
pub mod history;
pub mod init;
pub mod post;
pub mod version;

pub use board::Board;
pub use fetch::Fetch;
pub use history::History;
pub use init::Init;
pub use post::Post;
pub use version::Version;
