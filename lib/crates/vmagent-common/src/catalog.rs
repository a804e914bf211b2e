//! Built-in image catalog used by basic templates.
//!
//! Basic templates pick one entry by name; everything the provider needs to
//! launch it (marketplace reference, OS family, launch method, init script)
//! comes from here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{LaunchMethod, OsType, ParseEnumError};

/// Built-in images selectable without an advanced image definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BuiltInImage {
    /// Default, also used when backfilling legacy records.
    #[default]
    #[serde(rename = "Windows Server 2016")]
    WindowsServer2016,
    #[serde(rename = "Ubuntu 16.04 LTS")]
    Ubuntu1604Lts,
}

/// Marketplace reference and launch defaults for a built-in image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProperties {
    pub publisher: &'static str,
    pub offer: &'static str,
    pub sku: &'static str,
    pub version: &'static str,
    pub os_type: OsType,
    pub launch_method: LaunchMethod,
    pub init_script: &'static str,
}

const WINDOWS_SERVER_2016: ImageProperties = ImageProperties {
    publisher: "MicrosoftWindowsServer",
    offer: "WindowsServer",
    sku: "2016-Datacenter",
    version: "latest",
    os_type: OsType::Windows,
    launch_method: LaunchMethod::Jnlp,
    init_script: "Set-ExecutionPolicy Unrestricted -Scope Process -Force\r\n\
New-Item -ItemType Directory -Force -Path C:\\agent | Out-Null\r\n\
Invoke-WebRequest -UseBasicParsing -Uri $env:AGENT_JAR_URL -OutFile C:\\agent\\agent.jar\r\n",
};

const UBUNTU_1604_LTS: ImageProperties = ImageProperties {
    publisher: "Canonical",
    offer: "UbuntuServer",
    sku: "16.04-LTS",
    version: "latest",
    os_type: OsType::Linux,
    launch_method: LaunchMethod::Ssh,
    init_script: "#!/bin/sh\n\
sudo apt-get -y update\n\
sudo apt-get install -y openjdk-8-jre-headless git\n",
};

impl BuiltInImage {
    pub const ALL: [BuiltInImage; 2] = [BuiltInImage::WindowsServer2016, BuiltInImage::Ubuntu1604Lts];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BuiltInImage::WindowsServer2016 => "Windows Server 2016",
            BuiltInImage::Ubuntu1604Lts => "Ubuntu 16.04 LTS",
        }
    }

    #[must_use]
    pub fn properties(self) -> &'static ImageProperties {
        match self {
            BuiltInImage::WindowsServer2016 => &WINDOWS_SERVER_2016,
            BuiltInImage::Ubuntu1604Lts => &UBUNTU_1604_LTS,
        }
    }

    /// Blank or unknown names resolve to the default image.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl FromStr for BuiltInImage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|img| trimmed.eq_ignore_ascii_case(img.as_str()))
            .ok_or_else(|| ParseEnumError {
                kind: "built-in image",
                value: s.to_string(),
                expected: "Windows Server 2016, Ubuntu 16.04 LTS",
            })
    }
}

impl fmt::Display for BuiltInImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
