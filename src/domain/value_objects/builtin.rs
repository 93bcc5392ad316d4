//! Runtime builtin module names

/// Modules the Node.js runtime provides without installation
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether `specifier` names a builtin, with or without `prefix`
///
/// Subpaths count: `fs/promises` is the `fs` builtin.
pub fn is_builtin(specifier: &str, prefix: &str) -> bool {
    let name = specifier.strip_prefix(prefix).unwrap_or(specifier);
    let head = name.split('/').next().unwrap_or(name);
    NODE_BUILTINS.contains(&head)
}
