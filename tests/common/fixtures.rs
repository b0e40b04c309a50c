//! Test fixtures - reusable content constants for tests.

/// Minimal project config; tspw never reads it.
pub const TSCONFIG: &str = "{ \"compilerOptions\": {} }\n";

/// A fake `tsc` run through `sh` (`TSPW_NODE=sh`).
///
/// Echoes its arguments, fails when the project directory contains a `FAIL`
/// file, and otherwise leaves a `compiled.marker` next to the project.
pub const FAKE_TSC: &str = r#"dir=$(dirname "$2")
echo "tsc $*"
if [ -f "$dir/FAIL" ]; then
  echo "error TS2304: Cannot find name 'missing'."
  echo "compiler gave up" >&2
  exit 2
fi
touch "$dir/compiled.marker"
exit 0
"#;
