//! PadHunter ESP-IDF std firmware
//!
//! Thread-based implementation using FreeRTOS threads and std::sync::mpsc
//! channels. The main thread runs the channel scheduler; the Wi-Fi driver
//! callbacks only touch the shared acquisition state and hand work to
//! threads via try_send.

#[cfg(not(feature = "c5-devkit"))]
compile_error!("select a board feature: c5-devkit");

mod radio;

use std::io::{Read, Write};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use padhunter::assoc::{ApEvent, AssociationHandler, Reaction};
use padhunter::display::{self, Hd44780};
use padhunter::filter::{mac_string, FrameFilter, Inspection, Sighting};
use padhunter::hopper::{ChannelScheduler, Hop};
use padhunter::pin::PairingSymbols;
use padhunter::state::{AcquisitionState, LockNotice, LockSource};
use padhunter::{board, comm, defaults, protocol, wps, HunterConfig};

use comm::LineReader;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::sys::{
    esp_event_base_t, esp_random, wifi_event_ap_probe_req_rx_t, wifi_event_ap_staconnected_t,
    wifi_event_t, wifi_event_t_WIFI_EVENT_AP_PROBEREQRECVED,
    wifi_event_t_WIFI_EVENT_AP_STACONNECTED, wifi_promiscuous_pkt_t,
    wifi_promiscuous_pkt_type_t, wifi_promiscuous_pkt_type_t_WIFI_PKT_MGMT,
};
use esp_idf_svc::wifi::{AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};
use protocol::{DeviceMessage, MsgBuffer, MAX_MSG_LEN, VERSION};
use radio::EspRadio;

type LcdPin = PinDriver<'static, AnyOutputPin, Output>;
type Lcd = Hd44780<LcdPin, Ets>;

const CONFIG: HunterConfig = HunterConfig::new();

// ── Shared state ─────────────────────────────────────────────────────

static ACQUISITION: AcquisitionState = AcquisitionState::new();
static FILTER: FrameFilter<'static> = FrameFilter::new(CONFIG.target, &ACQUISITION);

/// Channel the scheduler last tuned to.
static CURRENT_CHANNEL: AtomicU8 = AtomicU8::new(CONFIG.plan[0]);

/// Boot time, captured once in main. Used for uptime.
static BOOT_INSTANT: Mutex<Option<Instant>> = Mutex::new(None);

fn uptime_secs() -> u32 {
    BOOT_INSTANT
        .lock()
        .ok()
        .and_then(|i| i.map(|boot| boot.elapsed().as_secs() as u32))
        .unwrap_or(0)
}

fn current_channel() -> u8 {
    CURRENT_CHANNEL.load(Ordering::Relaxed)
}

// ── Global senders (for Wi-Fi driver callbacks) ──────────────────────

static SIGHTING_TX: Mutex<Option<SyncSender<Sighting>>> = Mutex::new(None);
static AP_EVENT_TX: Mutex<Option<SyncSender<ApEvent>>> = Mutex::new(None);

fn forward<T>(slot: &Mutex<Option<SyncSender<T>>>, value: T) {
    if let Ok(guard) = slot.lock() {
        if let Some(ref tx) = *guard {
            let _ = tx.try_send(value);
        }
    }
}

// ── Wi-Fi promiscuous callback ───────────────────────────────────────

/// Runs in the Wi-Fi driver task. Must not block: the filter is a single
/// compare-exchange, and only the one frame that takes the lock is queued.
unsafe extern "C" fn promisc_rx_cb(
    buf: *mut std::ffi::c_void,
    pkt_type: wifi_promiscuous_pkt_type_t,
) {
    if pkt_type != wifi_promiscuous_pkt_type_t_WIFI_PKT_MGMT || ACQUISITION.is_locked() {
        return;
    }
    let pkt = unsafe { &*(buf as *const wifi_promiscuous_pkt_t) };
    let channel = pkt.rx_ctrl.channel() as u8;
    let sig_len = pkt.rx_ctrl.sig_len() as usize;

    if sig_len == 0 {
        return;
    }

    // Safety: payload is `sig_len` bytes starting at pkt.payload
    let payload = unsafe { std::slice::from_raw_parts(pkt.payload.as_ptr(), sig_len) };

    if let Inspection::Locked(sighting) = FILTER.inspect(payload, channel) {
        forward(&SIGHTING_TX, sighting);
    }
}

// ── AP event callback ────────────────────────────────────────────────

/// Runs in the default event loop task. Decodes the two AP events we care
/// about and hands them to the association thread.
unsafe extern "C" fn ap_event_cb(
    _arg: *mut std::ffi::c_void,
    _base: esp_event_base_t,
    event_id: i32,
    data: *mut std::ffi::c_void,
) {
    if data.is_null() {
        return;
    }
    let event = match event_id as wifi_event_t {
        wifi_event_t_WIFI_EVENT_AP_PROBEREQRECVED => {
            let info = unsafe { &*(data as *const wifi_event_ap_probe_req_rx_t) };
            ApEvent::ProbeSeen { mac: info.mac }
        }
        wifi_event_t_WIFI_EVENT_AP_STACONNECTED => {
            let info = unsafe { &*(data as *const wifi_event_ap_staconnected_t) };
            ApEvent::StationConnected { mac: info.mac }
        }
        _ => return,
    };
    forward(&AP_EVENT_TX, event);
}

fn main() -> anyhow::Result<()> {
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    *BOOT_INSTANT.lock().unwrap() = Some(Instant::now());

    log::info!("PadHunter v{} starting on {} (std)", VERSION, board::BOARD_NAME);

    // ── Pairing code ─────────────────────────────────────────────────

    let symbols = PairingSymbols::from_random(unsafe { esp_random() });
    let pin = symbols.code();
    log::info!("WPS PIN Generated: {}", pin);

    // ── Peripherals ──────────────────────────────────────────────────

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── LCD ──────────────────────────────────────────────────────────

    let mut lcd = lcd_from_board()?;
    lcd.init()?;
    display::load_suit_glyphs(&mut lcd)?;
    display::show_pairing_screen(&mut lcd, &symbols)?;

    // ── Channels ─────────────────────────────────────────────────────

    let (sighting_tx, sighting_rx) = mpsc::sync_channel::<Sighting>(1);
    let (ap_tx, ap_rx) = mpsc::sync_channel::<ApEvent>(8);
    let (output_tx, output_rx) = mpsc::sync_channel::<MsgBuffer>(8);

    *SIGHTING_TX.lock().unwrap() = Some(sighting_tx);
    *AP_EVENT_TX.lock().unwrap() = Some(ap_tx);

    // ── Output thread ────────────────────────────────────────────────

    thread::Builder::new()
        .name("output".into())
        .stack_size(4096)
        .spawn(move || {
            output_thread(output_rx);
        })?;

    // ── Sighting thread ──────────────────────────────────────────────

    let sighting_output_tx = output_tx.clone();
    thread::Builder::new()
        .name("sighting".into())
        .stack_size(4096)
        .spawn(move || {
            sighting_thread(sighting_rx, sighting_output_tx);
        })?;

    // ── Association thread (owns the LCD from here on) ───────────────

    let assoc_output_tx = output_tx.clone();
    thread::Builder::new()
        .name("assoc".into())
        .stack_size(4096)
        .spawn(move || {
            assoc_thread(ap_rx, lcd, assoc_output_tx);
        })?;

    // ── Console and status threads ───────────────────────────────────

    let console_output_tx = output_tx.clone();
    thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(move || {
            console_thread(console_output_tx);
        })?;

    let status_output_tx = output_tx.clone();
    thread::Builder::new()
        .name("status".into())
        .stack_size(4096)
        .spawn(move || {
            status_thread(status_output_tx);
        })?;
    log::info!("Worker threads spawned");

    // ── Pairing AP + sniffer ─────────────────────────────────────────

    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?;
    wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
        ssid: defaults::AP_SSID
            .try_into()
            .map_err(|_| anyhow::anyhow!("AP SSID too long"))?,
        channel: CONFIG.plan[0],
        auth_method: AuthMethod::WPA2Personal,
        password: pin
            .as_str()
            .try_into()
            .map_err(|_| anyhow::anyhow!("PIN does not fit the AP password"))?,
        max_connections: defaults::AP_MAX_CONNECTIONS,
        ..Default::default()
    }))?;

    // Lives as long as main, which never returns once the hunt starts
    let element = wps::pairing_element()
        .ok_or_else(|| anyhow::anyhow!("WPS element does not fit"))?;
    radio::install_pairing_element(&element)?;
    radio::subscribe_ap_events(ap_event_cb)?;

    wifi.start()?;
    log::info!("Pairing AP '{}' up on channel {}", defaults::AP_SSID, CONFIG.plan[0]);

    radio::start_capture(Some(promisc_rx_cb))?;

    let target = mac_string(&CONFIG.target);
    log::info!("Waiting for Target MAC: {}", target);
    emit(
        &output_tx,
        &DeviceMessage::Boot {
            version: VERSION,
            board: board::BOARD_NAME,
            target: &target,
            pin: pin.as_str(),
        },
    );

    // ── Channel scheduler (main thread) ──────────────────────────────

    let mut scheduler = ChannelScheduler::from_config(&CONFIG, &ACQUISITION);
    let mut radio = EspRadio;
    let mut delay = FreeRtos;
    loop {
        if let Hop::Moved { to, .. } = scheduler.cycle(&mut radio, &mut delay) {
            CURRENT_CHANNEL.store(to, Ordering::Relaxed);
            emit(&output_tx, &DeviceMessage::Hop { ch: to });
        }
    }
}

/// Erase the board's LCD pin numbers into one driver type.
fn lcd_from_board() -> anyhow::Result<Lcd> {
    // Safety: these GPIOs are not claimed anywhere else in the firmware
    let out = |gpio: u8| -> anyhow::Result<LcdPin> {
        Ok(PinDriver::output(unsafe { AnyOutputPin::new(gpio as i32) })?)
    };
    Ok(Hd44780::new(
        out(board::LCD_RS_PIN)?,
        out(board::LCD_EN_PIN)?,
        [
            out(board::LCD_D4_PIN)?,
            out(board::LCD_D5_PIN)?,
            out(board::LCD_D6_PIN)?,
            out(board::LCD_D7_PIN)?,
        ],
        Ets,
    ))
}

fn emit(output_tx: &SyncSender<MsgBuffer>, msg: &DeviceMessage) {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok();
    if let Some(len) = comm::serialize_message(msg, &mut buf) {
        buf.truncate(len);
        let _ = output_tx.try_send(buf);
    }
}

// ── Sighting thread ──────────────────────────────────────────────────

fn sighting_thread(sighting_rx: mpsc::Receiver<Sighting>, output_tx: SyncSender<MsgBuffer>) {
    while let Ok(sighting) = sighting_rx.recv() {
        log::info!(
            "{}",
            LockNotice {
                source: LockSource::Capture,
                channel: sighting.channel,
            }
        );
        if !sighting.ssid.is_empty() {
            log::info!("GamePad probing for '{}'", sighting.ssid);
        }
        if let Some(msg) = comm::lock_message(&ACQUISITION, sighting.channel) {
            emit(&output_tx, &msg);
        }
    }
}

// ── Association thread ───────────────────────────────────────────────

fn assoc_thread(ap_rx: mpsc::Receiver<ApEvent>, lcd: Lcd, output_tx: SyncSender<MsgBuffer>) {
    let mut handler = AssociationHandler::new(CONFIG.target, &ACQUISITION, lcd);

    while let Ok(event) = ap_rx.recv() {
        let channel = current_channel();
        match handler.handle(&event, channel) {
            Reaction::Locked => {
                if let Some(msg) = comm::lock_message(&ACQUISITION, channel) {
                    emit(&output_tx, &msg);
                }
            }
            Reaction::Connected { target, .. } => {
                if let ApEvent::StationConnected { mac } = event {
                    let mac = mac_string(&mac);
                    emit(&output_tx, &DeviceMessage::Connect { mac: &mac, target });
                }
            }
            Reaction::AlreadyLocked | Reaction::Ignored => {}
        }
    }
}

// ── Output thread ────────────────────────────────────────────────────

fn output_thread(output_rx: mpsc::Receiver<MsgBuffer>) {
    let mut stdout = std::io::stdout();
    while let Ok(msg) = output_rx.recv() {
        let _ = stdout.write_all(&msg);
        let _ = stdout.flush();
    }
}

// ── Status thread ────────────────────────────────────────────────────

fn status_thread(output_tx: SyncSender<MsgBuffer>) {
    loop {
        thread::sleep(Duration::from_secs(defaults::STATUS_INTERVAL_SECS));
        let msg = comm::status_message(&ACQUISITION, current_channel(), uptime_secs());
        emit(&output_tx, &msg);
    }
}

// ── Console thread ───────────────────────────────────────────────────

fn console_thread(output_tx: SyncSender<MsgBuffer>) {
    let mut stdin = std::io::stdin();
    let mut reader = LineReader::new();
    let mut chunk = [0u8; 64];

    loop {
        // The VFS console is non-blocking; nothing read is not an error
        let n = match stdin.read(&mut chunk) {
            Ok(n) if n > 0 => n,
            _ => {
                thread::sleep(Duration::from_millis(50));
                continue;
            }
        };
        for &byte in &chunk[..n] {
            if let Some(line) = reader.feed(byte) {
                if let Some(cmd) = comm::parse_command(line) {
                    let reply =
                        comm::handle_command(cmd, &ACQUISITION, current_channel(), uptime_secs());
                    emit(&output_tx, &reply);
                }
            }
        }
    }
}
