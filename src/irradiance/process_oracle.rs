use super::oracle::{IrradianceOracle, IrradianceQuery, OracleError, parse_irradiance};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Runs the irradiance model as a child process, e.g. `Rscript --vanilla irradiance.R`,
/// appending the query's seven values as positional arguments.
///
/// The child is killed if the call is dropped before it finishes.
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    program: String,
    args: Vec<String>,
}

impl ProcessOracle {
    pub fn new(program: impl Into<String>, args: &[String]) -> Self {
        Self { program: program.into(), args: args.to_vec() }
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl IrradianceOracle for ProcessOracle {
    async fn global_irradiance(&self, query: &IrradianceQuery) -> Result<f64, OracleError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(query.to_args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(OracleError::Launch)?;
        if !output.status.success() {
            return Err(OracleError::Exit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_irradiance(&String::from_utf8_lossy(&output.stdout))
    }
}
