pub mod paced_dispatcher;
