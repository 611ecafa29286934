//! 外部命令执行
//!
//! 每次调用启动一个子进程，完整读取 stdout / stderr 并等待其退出后才返回，
//! 出错路径也不例外（由 duct 的 `run()` 保证）。

use super::error::{FlatpakError, Result};
use super::types::CommandOutput;

/// 执行 `command[0] command[1..] args...`，捕获输出。
///
/// 非零退出码不在这里当作错误，由调用方决定；只有启动失败才返回 `Err`。
pub fn run_capture(command: &[String], args: &[String]) -> Result<CommandOutput> {
    let (program, leading) = command.split_first().ok_or(FlatpakError::EmptyCommand)?;

    let mut argv: Vec<&str> = leading.iter().map(String::as_str).collect();
    argv.extend(args.iter().map(String::as_str));

    let output = duct::cmd(program.as_str(), argv)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|source| FlatpakError::Spawn {
            program: program.clone(),
            source,
        })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        code: output.status.code(),
    })
}

/// 执行命令，非零退出码转为 `FlatpakError::Exit`
pub fn run_checked(command: &[String], args: &[String]) -> Result<CommandOutput> {
    let output = run_capture(command, args)?;
    if !output.success() {
        return Err(exit_error(command, args, &output));
    }
    Ok(output)
}

pub(crate) fn exit_error(command: &[String], args: &[String], output: &CommandOutput) -> FlatpakError {
    FlatpakError::Exit {
        command: display_command(command, args),
        code: output.code,
        stderr: output.stderr.trim().to_string(),
    }
}

/// 拼出便于阅读的命令行，用于日志和错误信息
pub fn display_command(command: &[String], args: &[String]) -> String {
    command
        .iter()
        .chain(args.iter())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(matches!(
            run_capture(&[], &[]),
            Err(FlatpakError::EmptyCommand)
        ));
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let command = strings(&["/nonexistent/flatpak-binary"]);
        match run_capture(&command, &strings(&["list"])) {
            Err(FlatpakError::Spawn { program, .. }) => {
                assert_eq!(program, "/nonexistent/flatpak-binary")
            }
            other => panic!("expected Spawn error, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_both_streams_and_exit_code() {
        let command = strings(&["sh", "-c", "echo out; echo err >&2; exit 3", "sh"]);
        let output = run_capture(&command, &[]).unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[test]
    fn test_run_checked_maps_nonzero_exit() {
        let command = strings(&["sh", "-c", "echo boom >&2; exit 1", "sh"]);
        let err = run_checked(&command, &strings(&["install"])).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
        match err {
            FlatpakError::Exit { stderr, command, .. } => {
                assert_eq!(stderr, "boom");
                assert!(command.ends_with("install"));
            }
            other => panic!("expected Exit error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command(&strings(&["flatpak"]), &strings(&["uninstall", "-y", "org.a.B"])),
            "flatpak uninstall -y org.a.B"
        );
    }
}
