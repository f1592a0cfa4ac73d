//! TZ-013: Command fan-out.
//!
//! Renders one command per target from a template, runs them with
//! bounded parallelism, and collects results in submission order. A
//! failing target never aborts the others; failure shows up in its own
//! result slot.

use super::{ClusterConfig, Host};
use crate::transport::{self, ExecOutput};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default parallelism bound.
pub const DEFAULT_LIMIT: usize = 8;

/// A named execution target.
#[derive(Debug, Clone)]
pub struct FanoutTarget {
    pub name: String,
    pub host: Host,
}

/// Result from a single target.
#[derive(Debug)]
pub struct FanoutResult {
    /// Target name.
    pub name: String,
    /// The rendered command that ran.
    pub command: String,
    /// Captured output, or a transport error.
    pub output: Result<ExecOutput, String>,
}

/// Targets from a cluster inventory, optionally filtered by role.
pub fn targets_from_cluster(config: &ClusterConfig, role: Option<&str>) -> Vec<FanoutTarget> {
    config
        .hosts
        .iter()
        .filter(|(_, host)| role.is_none_or(|r| host.has_role(r)))
        .map(|(name, host)| FanoutTarget {
            name: name.clone(),
            host: host.clone(),
        })
        .collect()
}

/// Targets from ad-hoc `user@addr` specs.
pub fn targets_from_specs(specs: &[String]) -> Vec<FanoutTarget> {
    specs
        .iter()
        .map(|spec| {
            let host = Host::from_spec(spec);
            FanoutTarget {
                name: host.addr.clone(),
                host,
            }
        })
        .collect()
}

/// N local worker targets.
pub fn local_workers(n: usize) -> Vec<FanoutTarget> {
    (0..n)
        .map(|i| FanoutTarget {
            name: format!("worker{}", i),
            host: Host::local(),
        })
        .collect()
}

/// Substitute `{name}`, `{addr}`, `{user}`, and `{worker}` placeholders.
pub fn render_command(template: &str, target: &FanoutTarget, index: usize) -> String {
    template
        .replace("{name}", &target.name)
        .replace("{addr}", &target.host.addr)
        .replace("{user}", &target.host.user)
        .replace("{worker}", &index.to_string())
}

/// Fan a command template out across targets.
///
/// At most `limit` commands run at once. Results come back in target
/// order regardless of completion order.
pub fn run_fanout(
    targets: Vec<FanoutTarget>,
    template: &str,
    limit: usize,
) -> Result<Vec<FanoutResult>, String> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to start fanout runtime: {}", e))?;

    runtime.block_on(async {
        let semaphore = Arc::new(Semaphore::new(limit.max(1)));
        let mut handles = Vec::with_capacity(targets.len());

        for (index, target) in targets.into_iter().enumerate() {
            let permit = semaphore.clone().acquire_owned().await;
            let command = render_command(template, &target, index);

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit; // Hold until this target is done
                let output = transport::exec(&target.host, &command);
                FanoutResult {
                    name: target.name,
                    command,
                    output,
                }
            });
            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => results.push(FanoutResult {
                    name: String::new(),
                    command: String::new(),
                    output: Err(format!("task panicked: {}", e)),
                }),
            }
        }
        Ok(results)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::parse_cluster;

    #[test]
    fn test_tz013_render_command() {
        let target = FanoutTarget {
            name: "web1".to_string(),
            host: Host::from_spec("deploy@10.0.0.1"),
        };
        assert_eq!(
            render_command("echo {name} {user}@{addr} #{worker}", &target, 3),
            "echo web1 deploy@10.0.0.1 #3"
        );
        assert_eq!(render_command("uptime", &target, 0), "uptime");
    }

    #[test]
    fn test_tz013_targets_from_cluster_role_filter() {
        let yaml = r#"
version: "1.0"
name: lab
hosts:
  web1:
    addr: 10.0.0.1
    roles: [web]
  gpu1:
    addr: 10.0.0.2
    roles: [gpu]
"#;
        let config = parse_cluster(yaml).unwrap();
        assert_eq!(targets_from_cluster(&config, None).len(), 2);
        let gpus = targets_from_cluster(&config, Some("gpu"));
        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].name, "gpu1");
    }

    #[test]
    fn test_tz013_local_workers() {
        let workers = local_workers(3);
        assert_eq!(workers.len(), 3);
        assert_eq!(workers[0].name, "worker0");
        assert_eq!(workers[2].name, "worker2");
        assert_eq!(workers[1].host.addr, "127.0.0.1");
    }

    #[test]
    fn test_tz013_fanout_local_echo() {
        let results = run_fanout(local_workers(4), "echo {worker}", 2).unwrap();
        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            let out = result.output.as_ref().unwrap();
            assert!(out.success());
            assert_eq!(out.stdout.trim(), i.to_string());
        }
    }

    #[test]
    fn test_tz013_fanout_failure_isolated() {
        let specs = vec!["127.0.0.1".to_string(), "localhost".to_string()];
        let mut targets = targets_from_specs(&specs);
        targets[0].name = "bad".to_string();

        let results = run_fanout(targets, "test {name} != bad", 2).unwrap();
        assert_eq!(results.len(), 2);
        let bad = results[0].output.as_ref().unwrap();
        assert!(!bad.success());
        let good = results[1].output.as_ref().unwrap();
        assert!(good.success());
    }

    #[test]
    fn test_tz013_results_in_submission_order() {
        // Later workers sleep less; order must still follow submission.
        let results = run_fanout(
            local_workers(3),
            "sleep 0.$((2 - {worker})); echo {worker}",
            3,
        )
        .unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["worker0", "worker1", "worker2"]);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.output.as_ref().unwrap().stdout.trim(), i.to_string());
        }
    }
}
