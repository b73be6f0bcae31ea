pub mod qualifications;
