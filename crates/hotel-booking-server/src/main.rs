//! Server implementation

#![warn(missing_docs)]

mod http;

use std::process;
use std::str::FromStr;
use std::thread;

use hotel_booking_core::{Config, RequestHandler};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the booking registry
    config: Config,

    /// Port for the HTTP server to listen on
    port: u16,
    /// Address for the HTTP server to listen on
    host: String,
    /// Number of request handler threads
    threads: u32,
}

impl Opts {
    fn from_args() -> Self {
        let mut opts = Opts {
            port: 8080,
            host: String::from("0.0.0.0"),
            config: Config::default(),
            threads: 8,
        };

        let mut option: Option<String> = None;
        for arg in std::env::args().skip(1) {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-port" => opts.port = parse_arg(&opt, &arg, "a decimal u16"),
                    "-host" => opts.host = arg,
                    "-rooms" => opts.config.rooms = parse_arg(&opt, &arg, "a decimal u32"),
                    "-threads" => opts.threads = parse_arg(&opt, &arg, "a decimal u32"),
                    _ => {
                        eprintln!("Error: unknown option {opt}");
                        process::exit(1);
                    }
                }
                option = None;
            } else {
                match arg.as_str() {
                    "-rest-status" => opts.config.rest_status = true,
                    _ => option = Some(arg),
                }
            }
        }
        if let Some(opt) = option {
            eprintln!("Error: leftover option {opt}");
            process::exit(1);
        }
        if opts.threads == 0 {
            eprintln!("Error: -threads must be positive");
            process::exit(1);
        }

        opts
    }
}

fn parse_arg<T: FromStr>(opt: &str, arg: &str, expected: &str) -> T {
    match arg.parse() {
        Ok(value) => value,
        Err(_) => {
            eprintln!("Error: {opt} takes {expected}, got `{arg}`");
            process::exit(1);
        }
    }
}

fn http_loop<H: RequestHandler>(server: &tiny_http::Server, handler: &H) {
    loop {
        match server.recv() {
            Ok(rq) => {
                if let Some(rq) = http::parse(rq) {
                    handler.handle(rq);
                }
            }
            Err(err) => {
                error!(%err, "HTTP receive failed");
                return;
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::from_args();

    let registry = match hotel_booking_registry::launch(&opts.config) {
        Ok(registry) => registry,
        Err(err) => {
            error!(%err, "could not set up the booking registry");
            process::exit(1);
        }
    };

    let server = match tiny_http::Server::http((opts.host.as_str(), opts.port)) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, host = %opts.host, port = opts.port, "could not start the HTTP server");
            process::exit(1);
        }
    };
    info!(
        host = %opts.host,
        port = opts.port,
        rooms = opts.config.rooms,
        threads = opts.threads,
        "server started"
    );

    thread::scope(|s| {
        for i in 0..opts.threads {
            let spawned = thread::Builder::new()
                .name(format!("handler_{i}"))
                .spawn_scoped(s, || http_loop(&server, &registry));
            if let Err(err) = spawned {
                error!(%err, "could not spawn handler thread {i}");
                process::exit(1);
            }
        }
    });

    registry.shutdown();
}
