use std::io;

use logerr::{env, global, kv, kverrors, Fields, KvError};

fn read_config(path: &str) -> Result<String, KvError> {
    std::fs::read_to_string(path)
        .map_err(|e| kverrors::wrap(e, "read config", kv! { "path" => path }))
}

fn main() {
    let options = match env::options_from_env() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("ignoring logging environment: {e}");
            Vec::new()
        }
    };
    global::init_with_options("json-demo", options, kv! { "pid" => std::process::id() });

    global::info("starting service", kv! { "port" => 8080 });

    let db = global::with_name("db").with_values(kv! { "pool" => "primary" });
    db.info("connected", Fields::new());
    db.v(1).info("only shown with LOGERR_VERBOSITY>=1", Fields::new());

    if let Err(err) = read_config("/nonexistent/app.toml") {
        global::error(&err, "startup degraded", kv! { "fallback" => "defaults" });
    }

    let unknown = kverrors::add(
        io::Error::new(io::ErrorKind::Other, "socket closed"),
        kv! { "peer" => "10.0.0.7:5432" },
    );
    db.error(&unknown, "query aborted", kv! { "table" => "users" });
}
