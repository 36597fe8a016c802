//! Host port allocation.

use std::net::TcpListener;

/// Ask the OS for a free port, then release it so the container can publish it.
pub fn allocate_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    tracing::info!(port, "Allocated port for PyThaiNLP service");
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocated_port_is_bindable() {
        let port = allocate_port().unwrap();
        assert_ne!(port, 0);
        // Released, so we can take it ourselves.
        let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
        drop(listener);
    }

    #[test]
    fn test_does_not_return_a_held_port() {
        let held = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let held_port = held.local_addr().unwrap().port();

        for _ in 0..16 {
            assert_ne!(allocate_port().unwrap(), held_port);
        }
    }
}
