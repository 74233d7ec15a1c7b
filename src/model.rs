//! Known busylight models
//!
//! Only the static description of the supported hardware lives here, finding
//! and opening the USB device is left to the transport implementation.

use crate::protocol::Family;

/// A supported device model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceModel {
    pub name: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub family: Family,
}

pub const BUSYLIGHT_UC: DeviceModel = DeviceModel {
    name: "BusyLight UC",
    vendor_id: 0x27BB,
    product_id: 0x3BCB,
    family: Family::Classic,
};

pub const BUSYLIGHT_LYNC: DeviceModel = DeviceModel {
    name: "BusyLight Lync",
    vendor_id: 0x04D8,
    product_id: 0xF848,
    family: Family::Classic,
};

pub const KUANDO_BUSYLIGHT: DeviceModel = DeviceModel {
    name: "Kuando BusyLight",
    vendor_id: 0x27BB,
    product_id: 0x3BCD,
    family: Family::Kuando,
};

pub const BUSYLIGHT_UC_OMEGA: DeviceModel = DeviceModel {
    name: "BusyLight UC Omega",
    vendor_id: 0x27BB,
    product_id: 0x3BCD,
    family: Family::Omega,
};

/// All supported models
pub static SUPPORTED_MODELS: [DeviceModel; 4] = [
    BUSYLIGHT_UC,
    BUSYLIGHT_LYNC,
    KUANDO_BUSYLIGHT,
    BUSYLIGHT_UC_OMEGA,
];

/// Models matching the USB ids, in table order
///
/// Different models may share the same ids (Kuando BusyLight and BusyLight UC
/// Omega do), so more than one model can match.
pub fn find_models(vendor_id: u16, product_id: u16) -> impl Iterator<Item = &'static DeviceModel> {
    SUPPORTED_MODELS
        .iter()
        .filter(move |model| model.vendor_id == vendor_id && model.product_id == product_id)
}
