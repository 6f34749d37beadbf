pub mod vetting;
