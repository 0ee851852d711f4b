pub mod archiver;
pub mod backup;
pub mod blacklist;
pub mod editor;
pub mod runtime;
