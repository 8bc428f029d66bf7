//! TCP ingress for the simulator link.
//!
//! Accepts one connection at a time and exchanges newline-delimited JSON:
//! a telemetry frame in, a path reply out. Malformed frames never break the
//! session; the previous path is re-emitted so the simulator always holds a
//! valid forward plan.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Planner;
use crate::error::Result;
use crate::io::messages::TelemetryFrame;

/// Telemetry server bound to the simulator port.
pub struct TelemetryServer {
    listener: TcpListener,
    running: Arc<AtomicBool>,
}

impl TelemetryServer {
    /// Bind the listen socket. A failure here is fatal to startup.
    pub fn bind(port: u16, running: Arc<AtomicBool>) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        log::info!("telemetry server listening on port {}", port);
        Ok(Self { listener, running })
    }

    /// Accept loop: serve simulator sessions until shutdown is signalled.
    pub fn run(&self, planner: &mut Planner) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    log::info!("simulator connected: {}", addr);
                    if let Err(e) = self.serve(stream, planner) {
                        log::warn!("session ended with error: {}", e);
                    }
                    log::info!("simulator disconnected: {}", addr);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(50));
                }
                Err(e) => {
                    log::error!("accept failed: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
        Ok(())
    }

    fn serve(&self, stream: TcpStream, planner: &mut Planner) -> Result<()> {
        // Accepted sockets inherit the listener's non-blocking mode
        stream.set_nonblocking(false)?;
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("failed to set TCP_NODELAY: {}", e);
        }

        let mut writer = stream.try_clone()?;
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let reply = match serde_json::from_str::<TelemetryFrame>(&line) {
                Ok(frame) => planner.handle_frame(&frame),
                Err(e) => {
                    // Skip the frame, keep the simulator on the old plan
                    log::warn!("malformed frame skipped: {}", e);
                    planner.previous_path()
                }
            };

            serde_json::to_writer(&mut writer, &reply)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }
}
