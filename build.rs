/*
 *  build.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Stamps the build date into the binary
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::Utc;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn main() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").map_err(io::Error::other)?;
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    fs::write(
        &dest_path,
        format!("pub const BUILD_DATE: &str = \"{}\";\n", build_date),
    )?;

    // only rerun when this script changes
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
