//! `mdc`: forward the command line to the metadesk daemon and print the reply.
//!
//! ```text
//! mdc focused --next
//! mdc root --child 0 --attrib name www
//! mdc root --subscribe lemonbar | lemonbar
//! ```
//!
//! Exits with the status code the daemon sent.  Everything after the status
//! line is copied to stdout line by line, so subscriptions stream until the
//! daemon goes away.

use log::{debug, warn};
use metadesk::ipc::default_socket_path;
use metadesk::ipc::protocol::{read_status, write_request};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let path = default_socket_path();
    let mut stream = match UnixStream::connect(&path) {
        Ok(stream) => stream,
        Err(e) => {
            debug!("connect {}: {}", path.display(), e);
            eprintln!("no metadesk daemon found");
            std::process::exit(1);
        }
    };

    if let Err(e) = write_request(&mut stream, &args) {
        eprintln!("failed to send request: {}", e);
        std::process::exit(1);
    }

    let mut reader = BufReader::new(stream);
    let status = match read_status(&mut reader) {
        Ok(status) => status,
        Err(e) => {
            eprintln!("bad response from daemon: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                if out.write_all(line.as_bytes()).and_then(|_| out.flush()).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("read from daemon: {}", e);
                break;
            }
        }
    }

    std::process::exit(status.code());
}
