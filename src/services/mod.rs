pub mod flag_service;
