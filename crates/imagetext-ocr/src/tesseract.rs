use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{OcrConfig, OcrEngine, OcrError};

/// Runs the `tesseract` CLI, piping the image through stdin and reading the
/// recognised text from stdout.
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
    timeout: Option<Duration>,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_path.clone(),
            language: config.language.clone(),
            timeout: config.timeout,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

fn spawn_error(binary: &Path, e: std::io::Error) -> OcrError {
    if e.kind() == std::io::ErrorKind::NotFound {
        OcrError::Unavailable(format!("{} not found", binary.display()))
    } else {
        OcrError::Failed(format!("spawn {}: {e}", binary.display()))
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn preflight_check(&self) -> Result<(), OcrError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match spawn_error(&self.binary, e) {
                OcrError::Failed(msg) => OcrError::Unavailable(msg),
                other => other,
            })?;
        if !output.status.success() {
            return Err(OcrError::Unavailable(format!(
                "{} --version exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        let version = String::from_utf8_lossy(&output.stdout);
        debug!(
            "tesseract available: {}",
            version.lines().next().unwrap_or_default()
        );
        Ok(())
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let started = Instant::now();
        let mut child = self
            .command()
            .spawn()
            .map_err(|e| spawn_error(&self.binary, e))?;

        let (Some(mut stdin), Some(mut stdout), Some(mut stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(OcrError::Failed("tesseract stdio not captured".into()));
        };

        let mut out = Vec::new();
        let mut err = Vec::new();

        // stdin is written while stdout/stderr drain so neither pipe can fill up.
        let io = async {
            let feed = async move {
                match stdin.write_all(image).await {
                    // The process may exit before consuming its input.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                }
                // stdin drops here so tesseract sees EOF.
            };
            let (_, _, _, status) = tokio::try_join!(
                feed,
                stdout.read_to_end(&mut out),
                stderr.read_to_end(&mut err),
                child.wait()
            )?;
            Ok::<_, std::io::Error>(status)
        };

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, io).await.map_err(|_| limit),
            None => Ok(io.await),
        };

        let status = match outcome {
            Ok(result) => result.map_err(|e| OcrError::Failed(format!("tesseract io: {e}")))?,
            Err(limit) => {
                warn!("tesseract timed out after {limit:?}, killing");
                let _ = child.kill().await;
                return Err(OcrError::Timeout(limit));
            }
        };

        if !status.success() {
            return Err(OcrError::Failed(format!(
                "tesseract exited with {status}: {}",
                String::from_utf8_lossy(&err).trim()
            )));
        }

        let text = String::from_utf8_lossy(&out).trim().to_string();
        debug!(
            "tesseract recognised {} chars from {} bytes in {:?}",
            text.len(),
            image.len(),
            started.elapsed()
        );
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn engine(binary: PathBuf, timeout: Option<Duration>) -> TesseractEngine {
        TesseractEngine::new(&OcrConfig {
            tesseract_path: binary,
            timeout,
            ..OcrConfig::default()
        })
    }

    // These subtests exec freshly written scripts and must run sequentially
    // in a single test to avoid ETXTBSY races with parallel test execution.
    #[tokio::test]
    async fn fake_tesseract_scenarios() {
        let tmp = tempfile::tempdir().unwrap();

        // Scenario 1: text on stdout is trimmed and returned
        let ok = write_script(tmp.path(), "ok", "cat > /dev/null\necho '  HELLO world  '");
        let text = engine(ok.clone(), None).recognize(b"image").await.unwrap();
        assert_eq!(text, "HELLO world");
        engine(ok, None).preflight_check().await.unwrap();

        // Scenario 2: arguments name stdin/stdout and the language
        let args = write_script(tmp.path(), "args", "cat > /dev/null\necho \"$@\"");
        let text = engine(args, None).recognize(b"image").await.unwrap();
        assert_eq!(text, "stdin stdout -l eng");

        // Scenario 3: the whole payload reaches stdin
        let count = write_script(tmp.path(), "count", "wc -c | tr -d ' '");
        let payload = vec![7u8; 256 * 1024];
        let text = engine(count, None).recognize(&payload).await.unwrap();
        assert_eq!(text, payload.len().to_string());

        // Scenario 4: non-zero exit surfaces stderr
        let fail = write_script(
            tmp.path(),
            "fail",
            "cat > /dev/null\necho 'Error in pixReadMem' >&2\nexit 1",
        );
        let err = engine(fail.clone(), None).recognize(b"x").await.unwrap_err();
        match err {
            OcrError::Failed(msg) => assert!(msg.contains("pixReadMem"), "{msg}"),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(
            engine(fail, None).preflight_check().await,
            Err(OcrError::Unavailable(_))
        ));

        // Scenario 5: a hung engine is killed once the timeout elapses
        let slow = write_script(tmp.path(), "slow", "sleep 5");
        let err = engine(slow, Some(Duration::from_millis(200)))
            .recognize(b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::Timeout(_)), "got {err:?}");

        // Scenario 6: missing binary
        let missing = tmp.path().join("no-such-tesseract");
        let err = engine(missing.clone(), None).recognize(b"x").await.unwrap_err();
        assert!(matches!(err, OcrError::Unavailable(_)), "got {err:?}");
        assert!(matches!(
            engine(missing, None).preflight_check().await,
            Err(OcrError::Unavailable(_))
        ));
    }
}
