mod config_tests;
mod diagnostics_tests;
mod provider_tests;
mod session_tests;
