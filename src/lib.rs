pub mod config;
pub mod error;

pub mod domain {
    pub mod entities {
        pub mod edit;
        pub mod record;
        pub mod session;
        pub mod sheet;
    }
    pub mod header;
    pub mod label;
    pub mod mapping;
    pub mod projector;
    pub mod validation;
}

pub mod usecase {
    pub mod ports {
        pub mod repo;
    }
    pub mod services {
        pub mod import_service;
        pub mod label_service;
        pub mod record_service;
    }
}

pub mod infra {
    pub mod import {
        pub mod csv;
        pub mod xlsx;
    }
    pub mod render {
        pub mod cards;
        pub mod pdf;
    }
    pub mod sqlite {
        pub mod queries;
        pub mod repo;
        pub mod schema;
    }
}

pub use error::{IngestError, Result};
