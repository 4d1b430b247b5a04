//! ESP-IDF Wi-Fi glue: the capture/retune seam for the scheduler, the WPS
//! element on the pairing AP, and raw AP event registration.

use std::ffi::c_void;

use esp_idf_svc::sys::{
    esp, esp_event_base_t, esp_event_handler_register, esp_wifi_set_channel,
    esp_wifi_set_event_mask, esp_wifi_set_promiscuous, esp_wifi_set_promiscuous_filter,
    esp_wifi_set_promiscuous_rx_cb, esp_wifi_set_vendor_ie, wifi_promiscuous_cb_t,
    wifi_promiscuous_filter_t, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE,
    wifi_vendor_ie_id_t_WIFI_VND_IE_ID_0, wifi_vendor_ie_type_t_WIFI_VND_IE_TYPE_BEACON,
    wifi_vendor_ie_type_t_WIFI_VND_IE_TYPE_PROBE_RESP, EspError, ESP_EVENT_ANY_ID, WIFI_EVENT,
    WIFI_EVENT_MASK_NONE, WIFI_PROMIS_FILTER_MASK_MGMT,
};

use padhunter::hopper::Radio;
use padhunter::wps::VendorElement;

/// Raw ESP-IDF event handler signature.
pub type EventHandler =
    unsafe extern "C" fn(*mut c_void, esp_event_base_t, i32, *mut c_void);

/// Promiscuous capture and channel control on the running Wi-Fi driver.
pub struct EspRadio;

impl Radio for EspRadio {
    type Error = EspError;

    fn set_capture(&mut self, enabled: bool) -> Result<(), EspError> {
        esp!(unsafe { esp_wifi_set_promiscuous(enabled) })
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), EspError> {
        esp!(unsafe { esp_wifi_set_channel(channel, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE) })
    }
}

/// Attach the WPS element to beacons and probe responses. Call after the
/// driver is initialised and before it is started.
pub fn install_pairing_element(element: &VendorElement) -> Result<(), EspError> {
    let ie = element.as_ptr() as *const c_void;
    for kind in [
        wifi_vendor_ie_type_t_WIFI_VND_IE_TYPE_BEACON,
        wifi_vendor_ie_type_t_WIFI_VND_IE_TYPE_PROBE_RESP,
    ] {
        esp!(unsafe { esp_wifi_set_vendor_ie(true, kind, wifi_vendor_ie_id_t_WIFI_VND_IE_ID_0, ie) })?;
    }
    Ok(())
}

/// Management frames only, delivered to `cb`, capture switched on.
pub fn start_capture(cb: wifi_promiscuous_cb_t) -> Result<(), EspError> {
    let filter = wifi_promiscuous_filter_t {
        filter_mask: WIFI_PROMIS_FILTER_MASK_MGMT,
    };
    unsafe {
        esp!(esp_wifi_set_promiscuous_filter(&filter))?;
        esp!(esp_wifi_set_promiscuous_rx_cb(cb))?;
    }
    EspRadio.set_capture(true)
}

/// The driver masks AP probe-request events by default; clear the mask and
/// route every Wi-Fi event to `handler`.
pub fn subscribe_ap_events(handler: EventHandler) -> Result<(), EspError> {
    unsafe {
        esp!(esp_wifi_set_event_mask(WIFI_EVENT_MASK_NONE))?;
        esp!(esp_event_handler_register(
            WIFI_EVENT,
            ESP_EVENT_ANY_ID,
            Some(handler),
            std::ptr::null_mut(),
        ))
    }
}
