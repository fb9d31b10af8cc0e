pub mod dump;
pub mod paldump;
pub mod scan;
