//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Trellis Configuration
# Only override what you want to change -- missing fields use defaults.
# Another file can be chosen with --config or TRELLIS_CONFIG.
# Environment overrides (applied after this file):
#   TRELLIS_PROXY_TIMEOUT_MS, TRELLIS_PROXY_VERIFY_TLS,
#   TRELLIS_SERVICE_<ID>_URL, TRELLIS_IPC_PORT

[ipc]
# host = "127.0.0.1"
# port = 47800

[windows]
# primary_route = "/"
# renderer = "/usr/local/bin/trellis-renderer"
# renderer_args = ["--window", "{window}", "--route", "{route}", "--ipc", "{ipc}"]
# exit_on_primary_close = true

[state]
# theme = "light"
# counter = 0
# language = "en"

[proxy]
# default_timeout_ms = 30000   # 100-600000
# verify_tls = true
# health_timeout_ms = 5000     # 100-600000

# [proxy.default_headers]
# Content-Type = "application/json"

# Declaring any [proxy.services.*] table replaces the built-in set
# (auth, file, api).
# [proxy.services.auth]
# target = "http://localhost:8081/auth"
# timeout_ms = 10000
# verify_tls = false
# rewrite = [{ pattern = "^/v1", replacement = "/internal" }]
#
# [proxy.services.auth.headers]
# X-Client = "trellis"

[logging]
# level = "INFO"               # TRACE, DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
