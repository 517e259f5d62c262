//! Recognized Compose keys
//!
//! Hand-maintained subset; anything outside these sets only produces an
//! "unknown key" warning.

/// Keys recognized at the top level of a document
pub const TOP_LEVEL_KEYS: &[&str] = &[
    "version", "services", "networks", "volumes", "configs", "secrets", "name",
];

/// Keys recognized inside a service definition
pub const SERVICE_KEYS: &[&str] = &[
    "annotations",
    "attach",
    "blkio_config",
    "build",
    "cap_add",
    "cap_drop",
    "cgroup",
    "cgroup_parent",
    "command",
    "configs",
    "container_name",
    "cpu_count",
    "cpu_percent",
    "cpu_period",
    "cpu_quota",
    "cpu_rt_period",
    "cpu_rt_runtime",
    "cpu_shares",
    "cpus",
    "cpuset",
    "credential_spec",
    "depends_on",
    "deploy",
    "develop",
    "device_cgroup_rules",
    "devices",
    "dns",
    "dns_opt",
    "dns_search",
    "domainname",
    "entrypoint",
    "env_file",
    "environment",
    "expose",
    "extends",
    "external_links",
    "extra_hosts",
    "group_add",
    "healthcheck",
    "hostname",
    "image",
    "init",
    "ipc",
    "isolation",
    "labels",
    "links",
    "logging",
    "mac_address",
    "mem_limit",
    "mem_reservation",
    "mem_swappiness",
    "memswap_limit",
    "network_mode",
    "networks",
    "oom_kill_disable",
    "oom_score_adj",
    "pid",
    "pids_limit",
    "platform",
    "ports",
    "privileged",
    "profiles",
    "pull_policy",
    "read_only",
    "restart",
    "runtime",
    "scale",
    "secrets",
    "security_opt",
    "shm_size",
    "stdin_open",
    "stop_grace_period",
    "stop_signal",
    "storage_opt",
    "sysctls",
    "tmpfs",
    "tty",
    "ulimits",
    "user",
    "userns_mode",
    "uts",
    "volumes",
    "volumes_from",
    "working_dir",
];

/// Accepted `restart` policies (the part before any `:`)
pub const RESTART_POLICIES: &[&str] = &["no", "always", "on-failure", "unless-stopped"];

pub fn is_top_level_key(key: &str) -> bool {
    TOP_LEVEL_KEYS.contains(&key)
}

pub fn is_service_key(key: &str) -> bool {
    SERVICE_KEYS.contains(&key)
}

/// Check a restart value, ignoring an `on-failure:N` style suffix
pub fn is_valid_restart_policy(value: &str) -> bool {
    let base = value.split(':').next().unwrap_or(value);
    RESTART_POLICIES.contains(&base)
}
