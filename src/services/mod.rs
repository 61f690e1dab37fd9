pub mod watch_service;
