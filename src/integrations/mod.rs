//! External collaborators: storage and notifications.

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod repository {
    pub use crate::repository::*;
}

pub mod mail {
    pub use crate::mail::*;
}

pub mod mail_client {
    pub use crate::mail_client::*;
}
