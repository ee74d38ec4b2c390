//! Archives are readable by the native tools.

use basher_lib::ArchiveFormat;

use super::common::{TestEnv, have};

#[test]
fn tar_listing_matches_native_archive() {
  let env = TestEnv::new();
  env.write_file("site/index.html", "<html></html>");
  env.write_file("site/css/app.css", "body {}");

  env.shell.archive("site", "ours.tar.gz", ArchiveFormat::TarGz).ok().unwrap();
  env.native("tar", &["-czf", "native.tar.gz", "site"]);

  let list = |archive: &str| {
    let mut lines: Vec<String> = String::from_utf8(env.native("tar", &["-tzf", archive]).stdout)
      .unwrap()
      .lines()
      .map(str::to_string)
      .collect();
    lines.sort();
    lines
  };
  assert_eq!(list("ours.tar.gz"), list("native.tar.gz"));
}

#[test]
fn gunzip_restores_native_gzip_output() {
  let env = TestEnv::new();
  env.write_file("data.txt", "compress me\n");
  env.native("gzip", &["-k", "data.txt"]);
  std::fs::rename(env.path("data.txt"), env.path("original.txt")).unwrap();

  env.shell.gunzip("data.txt.gz", false).ok().unwrap();
  assert_eq!(
    std::fs::read(env.path("data.txt")).unwrap(),
    std::fs::read(env.path("original.txt")).unwrap()
  );
}

#[test]
fn zip_contents_visible_to_unzip() {
  if !have("zip") || !have("unzip") {
    return;
  }
  let env = TestEnv::new();
  env.write_file("bundle/readme.md", "# hi");
  env.shell.archive("bundle", "bundle.zip", ArchiveFormat::Zip).ok().unwrap();
  let listing = env.native("unzip", &["-l", "bundle.zip"]);
  assert!(String::from_utf8_lossy(&listing.stdout).contains("bundle/readme.md"));
}
