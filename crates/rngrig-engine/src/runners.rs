//! The suite registry: how each battery is invoked and analyzed.
//!
//! Each suite maps to a [`LaunchPlan`] describing the tool, its argument
//! vector, working directory, stdin wiring, and how the output turns into
//! a verdict. The supervisor executes plans; nothing else in the engine
//! knows per-tool details.

use std::path::{Path, PathBuf};

use rngrig_config::ExecutionMode;
use rngrig_resolver::{StdinMode, ToolId};

use crate::job::TestSuite;

/// Relative path (under the tools root) of the report the bit-sequence
/// battery writes.
pub const STS_REPORT_PATH: [&str; 4] = [
    "sts",
    "experiments",
    "AlgorithmTesting",
    "finalAnalysisReport.txt",
];

/// How a plan's output becomes a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Exit code alone decides (zero passes).
    ExitCode,
    /// Buffered: the small battery's textual summary markers.
    SmallBattery,
    /// Buffered: the entropy estimator's five parsed fields.
    Ent,
    /// Streaming with early abort: the sequential bit-stream scanner.
    SequentialStream,
    /// Streaming with early abort: the dieharder-style weak/fail scanner.
    WeakStream,
}

/// What is actually spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A resolved tool with an argument vector.
    Tool { tool: ToolId, args: Vec<String> },
    /// A containerized form: `docker run --rm -v <host dir>:/data <image>
    /// <command...>`.
    Container {
        image: String,
        volume: (PathBuf, String),
        command: Vec<String>,
    },
}

/// Complete instructions for running one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub invocation: Invocation,
    /// Working directory, under the tools root.
    pub cwd: Option<&'static str>,
    pub stdin: StdinMode,
    pub analysis: AnalysisMode,
    /// Report file (relative to the tools root) read after exit and folded
    /// into the verdict.
    pub report: Option<&'static [&'static str]>,
}

/// Context a plan is built against.
pub struct PlanContext<'a> {
    pub mode: ExecutionMode,
    pub container_image: &'a str,
}

/// Build the launch plan for a suite.
///
/// This is the engine's dispatch table; the match is total over
/// [`TestSuite`], so an unknown suite never reaches it.
#[must_use]
pub fn plan_for(suite: TestSuite, input_file: &Path, ctx: &PlanContext<'_>) -> LaunchPlan {
    let file_arg = input_file.to_string_lossy().into_owned();

    match suite {
        TestSuite::PractRand => LaunchPlan {
            invocation: Invocation::Tool {
                tool: ToolId::PractRand,
                args: vec![
                    "stdin64".to_string(),
                    "-a".to_string(),
                    "-multithreaded".to_string(),
                ],
            },
            cwd: Some("practrand"),
            // The tester reads the stream from stdin; the supervisor pipes
            // the input file in.
            stdin: StdinMode::Piped,
            analysis: AnalysisMode::SequentialStream,
            report: None,
        },
        TestSuite::SmallCrush => LaunchPlan {
            invocation: Invocation::Tool {
                tool: ToolId::Testu01Scrush,
                args: vec![file_arg],
            },
            cwd: Some("crushing"),
            stdin: StdinMode::Null,
            analysis: AnalysisMode::SmallBattery,
            report: None,
        },
        TestSuite::Crush => exit_code_battery(ToolId::Testu01Crush, file_arg),
        TestSuite::BigCrush => exit_code_battery(ToolId::Testu01Bcrush, file_arg),
        TestSuite::Alpha => exit_code_battery(ToolId::Testu01Alpha, file_arg),
        TestSuite::Rabbit => exit_code_battery(ToolId::Testu01Rabbit, file_arg),
        TestSuite::NistSts => {
            if ctx.mode == ExecutionMode::Container {
                let input_dir = input_file
                    .parent()
                    .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
                LaunchPlan {
                    invocation: Invocation::Container {
                        image: ctx.container_image.to_string(),
                        volume: (input_dir, "/data".to_string()),
                        command: vec!["niststs".to_string()],
                    },
                    cwd: None,
                    stdin: StdinMode::Null,
                    analysis: AnalysisMode::ExitCode,
                    report: Some(&STS_REPORT_PATH),
                }
            } else {
                LaunchPlan {
                    invocation: Invocation::Tool {
                        tool: ToolId::NistSts,
                        args: vec![
                            "-fast".to_string(),
                            "-fileoutput".to_string(),
                            "1000000".to_string(),
                            file_arg,
                        ],
                    },
                    cwd: Some("sts"),
                    stdin: StdinMode::Null,
                    analysis: AnalysisMode::ExitCode,
                    report: Some(&STS_REPORT_PATH),
                }
            }
        }
        TestSuite::DieHarder => LaunchPlan {
            invocation: Invocation::Tool {
                tool: ToolId::Dieharder,
                args: vec![
                    "-a".to_string(),
                    "-g".to_string(),
                    "201".to_string(),
                    "-f".to_string(),
                    file_arg,
                ],
            },
            cwd: None,
            stdin: StdinMode::Null,
            analysis: AnalysisMode::WeakStream,
            report: None,
        },
        TestSuite::Ent => LaunchPlan {
            invocation: Invocation::Tool {
                tool: ToolId::Ent,
                args: vec![file_arg],
            },
            cwd: Some("ent"),
            stdin: StdinMode::Null,
            analysis: AnalysisMode::Ent,
            report: None,
        },
    }
}

/// The empirical-battery variants that are judged on exit code alone.
fn exit_code_battery(tool: ToolId, file_arg: String) -> LaunchPlan {
    LaunchPlan {
        invocation: Invocation::Tool {
            tool,
            args: vec![file_arg],
        },
        cwd: Some("crushing"),
        stdin: StdinMode::Null,
        analysis: AnalysisMode::ExitCode,
        report: None,
    }
}

/// One-line invocation summary for listings and preflight output.
#[must_use]
pub fn invocation_summary(suite: TestSuite) -> &'static str {
    match suite {
        TestSuite::PractRand => "RNG_test stdin64 -a -multithreaded  (file on stdin)",
        TestSuite::SmallCrush => "scrush <file>",
        TestSuite::Crush => "crush <file>",
        TestSuite::BigCrush => "Bcrush <file>",
        TestSuite::Alpha => "alpha <file>",
        TestSuite::Rabbit => "rabbit <file>",
        TestSuite::NistSts => "nist -fast -fileoutput 1000000 <file>  (report scanned after exit)",
        TestSuite::DieHarder => "dieharder -a -g 201 -f <file>",
        TestSuite::Ent => "ent <file>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn native_ctx() -> PlanContext<'static> {
        PlanContext {
            mode: ExecutionMode::Native,
            container_image: "rngrig-tools",
        }
    }

    #[test]
    fn practrand_streams_stdin() {
        let plan = plan_for(TestSuite::PractRand, Path::new("/data/s.bin"), &native_ctx());
        assert_eq!(plan.stdin, StdinMode::Piped);
        assert_eq!(plan.analysis, AnalysisMode::SequentialStream);
        match plan.invocation {
            Invocation::Tool { tool, args } => {
                assert_eq!(tool, ToolId::PractRand);
                // The input file is never an argument; it goes to stdin.
                assert_eq!(args, vec!["stdin64", "-a", "-multithreaded"]);
            }
            Invocation::Container { .. } => panic!("not containerized"),
        }
    }

    #[test]
    fn crush_family_is_exit_code_only() {
        for suite in [
            TestSuite::Crush,
            TestSuite::BigCrush,
            TestSuite::Alpha,
            TestSuite::Rabbit,
        ] {
            let plan = plan_for(suite, Path::new("/data/s.bin"), &native_ctx());
            assert_eq!(plan.analysis, AnalysisMode::ExitCode);
            assert_eq!(plan.cwd, Some("crushing"));
            assert!(plan.report.is_none());
            match plan.invocation {
                Invocation::Tool { args, .. } => assert_eq!(args, vec!["/data/s.bin"]),
                Invocation::Container { .. } => panic!("not containerized"),
            }
        }
    }

    #[test]
    fn nist_native_plan_has_fixed_flags_and_report() {
        let plan = plan_for(TestSuite::NistSts, Path::new("/data/s.bin"), &native_ctx());
        assert_eq!(plan.cwd, Some("sts"));
        assert_eq!(plan.report, Some(&STS_REPORT_PATH[..]));
        match plan.invocation {
            Invocation::Tool { tool, args } => {
                assert_eq!(tool, ToolId::NistSts);
                assert_eq!(args, vec!["-fast", "-fileoutput", "1000000", "/data/s.bin"]);
            }
            Invocation::Container { .. } => panic!("native mode"),
        }
    }

    #[test]
    fn nist_container_plan_mounts_the_input_directory() {
        let ctx = PlanContext {
            mode: ExecutionMode::Container,
            container_image: "custom-image",
        };
        let plan = plan_for(TestSuite::NistSts, Path::new("/data/sub/s.bin"), &ctx);
        assert_eq!(plan.report, Some(&STS_REPORT_PATH[..]));
        match plan.invocation {
            Invocation::Container {
                image,
                volume,
                command,
            } => {
                assert_eq!(image, "custom-image");
                assert_eq!(volume.0, PathBuf::from("/data/sub"));
                assert_eq!(volume.1, "/data");
                assert_eq!(command, vec!["niststs"]);
            }
            Invocation::Tool { .. } => panic!("container mode"),
        }
    }

    #[test]
    fn container_mode_only_changes_nist() {
        let ctx = PlanContext {
            mode: ExecutionMode::Container,
            container_image: "custom-image",
        };
        let plan = plan_for(TestSuite::Ent, Path::new("/data/s.bin"), &ctx);
        assert!(matches!(plan.invocation, Invocation::Tool { .. }));
    }

    #[test]
    fn dieharder_plan_matches_documented_invocation() {
        let plan = plan_for(TestSuite::DieHarder, Path::new("/data/s.bin"), &native_ctx());
        assert_eq!(plan.analysis, AnalysisMode::WeakStream);
        match plan.invocation {
            Invocation::Tool { tool, args } => {
                assert_eq!(tool, ToolId::Dieharder);
                assert_eq!(args, vec!["-a", "-g", "201", "-f", "/data/s.bin"]);
            }
            Invocation::Container { .. } => panic!("not containerized"),
        }
    }
}
