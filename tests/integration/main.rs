//! End-to-end tests driving the relay over real sockets.

mod helpers;

mod broadcast_test;
mod ws_test;
