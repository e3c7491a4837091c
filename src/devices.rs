//! Camera discovery and the session's device registry.
//!
//! Cameras are found by parsing the tabular listing of the enumeration
//! command. A discovery run fully replaces the registry; there is no merge
//! with previously known cameras. Camera identity is the connection address
//! (`usb:bus,dev`), which stays fixed for the life of a registry snapshot,
//! while the display name is user-assigned.

use crate::tool::{CameraTool, ToolError};

/// A camera reachable through a stable connection address.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    address: String,
}

impl Device {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// User-assigned display name (initially the model column text).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connection address, immutable for the device's lifetime.
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Errors from a discovery run.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The enumeration tool could not be run or exited with an error.
    #[error("camera query failed: {0}")]
    ToolUnavailable(#[from] ToolError),

    /// The tool ran fine but reported zero cameras.
    #[error("no cameras found")]
    NoneFound,
}

/// Errors from renaming a registry entry.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenameError {
    #[error("camera name must not be empty")]
    EmptyName,
    #[error("no camera with id {0}")]
    NoSuchDevice(usize),
}

/// The ordered list of cameras known to the current session.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn get(&self, index: usize) -> Option<&Device> {
        self.devices.get(index)
    }

    /// Query for connected cameras and replace the registry with the result.
    ///
    /// On either error the previous registry contents are left untouched:
    /// a failed invocation yields [`DiscoveryError::ToolUnavailable`], and a
    /// successful run that parses zero rows yields
    /// [`DiscoveryError::NoneFound`] (callers report the two differently).
    pub fn discover(&mut self, tool: &dyn CameraTool) -> Result<usize, DiscoveryError> {
        let listing = tool.detect()?;
        let found = parse_detect_output(&listing);
        if found.is_empty() {
            return Err(DiscoveryError::NoneFound);
        }
        self.devices = found;
        Ok(self.devices.len())
    }

    /// Replace the display name at `index`.
    ///
    /// Empty names are rejected. Duplicates are not: two cameras with the
    /// same name surface later as a filename collision, which is the user's
    /// to resolve.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), RenameError> {
        if name.is_empty() {
            return Err(RenameError::EmptyName);
        }
        match self.devices.get_mut(index) {
            Some(device) => {
                device.name = name.to_string();
                Ok(())
            }
            None => Err(RenameError::NoSuchDevice(index)),
        }
    }

    /// Render the registry as an aligned table (ID, Name, Port columns).
    ///
    /// The name column is sized to the longest current display name.
    pub fn table(&self) -> String {
        let id_width = 4;
        let name_width = 2 + self
            .devices
            .iter()
            .map(|d| d.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Name".len());
        let mut out = String::new();
        out.push_str(&format!(
            "{:<id$}{:<name$}{}\n",
            "ID",
            "Name",
            "Port",
            id = id_width,
            name = name_width
        ));
        for (i, device) in self.devices.iter().enumerate() {
            out.push_str(&format!(
                "{:<id$}{:<name$}({})\n",
                format!("{}:", i),
                device.name,
                device.address,
                id = id_width,
                name = name_width
            ));
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn with_devices(devices: Vec<Device>) -> Self {
        Self { devices }
    }
}

/// Parse the tabular auto-detect listing into devices, in row order.
///
/// Expected rows: a model column, at least two spaces, then a `usb:`
/// address token terminated by whitespace or end of line. The header, the
/// dashed separator, and anything else that does not match are ignored.
pub fn parse_detect_output(listing: &str) -> Vec<Device> {
    listing.lines().filter_map(parse_detect_line).collect()
}

fn parse_detect_line(line: &str) -> Option<Device> {
    let pos = line.find("usb:")?;
    let (model_part, addr_part) = line.split_at(pos);
    // The model column is separated from the port column by at least two
    // spaces; a single space means this is not a device row.
    if !model_part.ends_with("  ") {
        return None;
    }
    let address = addr_part.split_whitespace().next()?.to_string();
    Some(Device::new(model_part.trim(), address))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Model                          Port                                            \n\
----------------------------------------------------------\n\
Canon PowerShot G2             usb:001,014\n\
Canon PowerShot G2             usb:001,023\n";

    #[test]
    fn test_parse_detect_line_valid() {
        let device = parse_detect_line("Canon PowerShot G2             usb:001,014").unwrap();
        assert_eq!(device.name(), "Canon PowerShot G2");
        assert_eq!(device.address(), "usb:001,014");
    }

    #[test]
    fn test_parse_detect_line_trailing_whitespace() {
        let device = parse_detect_line("Nikon D90   usb:002,007   ").unwrap();
        assert_eq!(device.name(), "Nikon D90");
        assert_eq!(device.address(), "usb:002,007");
    }

    #[test]
    fn test_parse_detect_line_single_space_rejected() {
        assert!(parse_detect_line("Canon PowerShot G2 usb:001,014").is_none());
    }

    #[test]
    fn test_parse_detect_line_header_and_separator_ignored() {
        assert!(parse_detect_line("Model                          Port").is_none());
        assert!(parse_detect_line("----------------------------------").is_none());
    }

    #[test]
    fn test_parse_detect_output_preserves_row_order_and_addresses() {
        let devices = parse_detect_output(LISTING);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].address(), "usb:001,014");
        assert_eq!(devices[1].address(), "usb:001,023");
        assert_eq!(devices[0].name(), "Canon PowerShot G2");
    }

    #[test]
    fn test_parse_detect_output_empty_listing() {
        assert!(parse_detect_output("Model   Port\n------\n").is_empty());
    }

    #[test]
    fn test_rename_rejects_empty_name() {
        let mut registry = DeviceRegistry::with_devices(parse_detect_output(LISTING));
        assert_eq!(registry.rename(0, ""), Err(RenameError::EmptyName));
        assert_eq!(registry.get(0).unwrap().name(), "Canon PowerShot G2");
    }

    #[test]
    fn test_rename_rejects_bad_index() {
        let mut registry = DeviceRegistry::new();
        assert_eq!(registry.rename(3, "Left"), Err(RenameError::NoSuchDevice(3)));
    }

    #[test]
    fn test_rename_replaces_display_name() {
        let mut registry = DeviceRegistry::with_devices(parse_detect_output(LISTING));
        registry.rename(1, "Right").unwrap();
        assert_eq!(registry.get(1).unwrap().name(), "Right");
        // Address untouched by rename.
        assert_eq!(registry.get(1).unwrap().address(), "usb:001,023");
    }

    #[test]
    fn test_rename_allows_duplicate_names() {
        let mut registry = DeviceRegistry::with_devices(parse_detect_output(LISTING));
        registry.rename(0, "Same").unwrap();
        assert!(registry.rename(1, "Same").is_ok());
    }

    #[test]
    fn test_table_aligns_to_longest_name() {
        let registry = DeviceRegistry::with_devices(vec![
            Device::new("A", "usb:001,002"),
            Device::new("Much Longer Name", "usb:001,003"),
        ]);
        let table = registry.table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        let port_col = lines[1].find("(usb:001,002)").unwrap();
        assert_eq!(port_col, lines[2].find("(usb:001,003)").unwrap());
        assert!(lines[0].starts_with("ID"));
    }
}
