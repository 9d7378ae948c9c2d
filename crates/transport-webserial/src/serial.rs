use actor_runtime::actor_debug;
use core_types::{
    ByteSource, FlowControl, ParityMode, ReadOutcome, SerialConfig, SerialHost, SourceError,
};
use js_sys::Uint8Array;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    FlowControlType, ParityType, ReadableStreamDefaultReader, SerialOptions, SerialPort,
};

/// Map a rejected Web Serial promise to a [`SourceError`]
///
/// DOMException names decide the class; `fallback` wraps anything
/// unrecognised. The message is kept for the user-facing text.
pub fn classify_js_error(err: &JsValue, fallback: fn(String) -> SourceError) -> SourceError {
    let (name, message) = if let Some(dom) = err.dyn_ref::<web_sys::DomException>() {
        (dom.name(), dom.message())
    } else if let Some(js) = err.dyn_ref::<js_sys::Error>() {
        (String::from(js.name()), String::from(js.message()))
    } else {
        (String::new(), format!("{:?}", err))
    };
    classify(&name, message, fallback)
}

fn classify(name: &str, message: String, fallback: fn(String) -> SourceError) -> SourceError {
    if message.contains("permissions policy") {
        return SourceError::PermissionDenied(message);
    }
    match name {
        "NotFoundError" => SourceError::NoDeviceSelected,
        "SecurityError" | "NotAllowedError" => SourceError::PermissionDenied(message),
        "NetworkError" => SourceError::NetworkError(message),
        "InvalidStateError" => SourceError::InvalidState(message),
        // Rejected SerialOptions (e.g. baud rate the browser refuses)
        "TypeError" => SourceError::InvalidConfiguration(message),
        _ if message.contains("No port selected") => SourceError::NoDeviceSelected,
        _ => fallback(message),
    }
}

/// Opens the browser's port chooser
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSerialHost;

impl WebSerialHost {
    pub fn new() -> Self {
        Self
    }

    /// Is `navigator.serial` present in this browser?
    pub fn is_supported() -> bool {
        web_sys::window()
            .map(|w| js_sys::Reflect::has(&w.navigator(), &JsValue::from_str("serial")).unwrap_or(false))
            .unwrap_or(false)
    }
}

impl SerialHost for WebSerialHost {
    type Source = WebSerialPort;

    async fn request_access(&self) -> Result<WebSerialPort, SourceError> {
        if !Self::is_supported() {
            return Err(SourceError::Unsupported(
                "navigator.serial is not available".into(),
            ));
        }
        let window =
            web_sys::window().ok_or_else(|| SourceError::Other("No window object".into()))?;

        let port_val = JsFuture::from(window.navigator().serial().request_port())
            .await
            .map_err(|e| classify_js_error(&e, SourceError::Other))?;
        let port: SerialPort = port_val
            .dyn_into()
            .map_err(|_| SourceError::Other("requestPort did not return a SerialPort".into()))?;

        Ok(WebSerialPort::new(port))
    }
}

/// A granted port; opened by the session, read through one stream reader
pub struct WebSerialPort {
    port: SerialPort,
    reader: Option<ReadableStreamDefaultReader>,
    is_open: bool,
}

impl WebSerialPort {
    pub fn new(port: SerialPort) -> Self {
        Self {
            port,
            reader: None,
            is_open: false,
        }
    }
}

fn serial_options(config: &SerialConfig) -> SerialOptions {
    let options = SerialOptions::new(config.baud_rate);
    options.set_data_bits(config.data_bits);
    options.set_stop_bits(config.stop_bits);
    options.set_parity(match config.parity {
        ParityMode::None => ParityType::None,
        ParityMode::Even => ParityType::Even,
        ParityMode::Odd => ParityType::Odd,
    });
    options.set_flow_control(match config.flow_control {
        FlowControl::None => FlowControlType::None,
        FlowControl::Hardware => FlowControlType::Hardware,
    });
    options
}

impl ByteSource for WebSerialPort {
    async fn open(&mut self, config: &SerialConfig) -> Result<(), SourceError> {
        JsFuture::from(self.port.open(&serial_options(config)))
            .await
            .map_err(|e| classify_js_error(&e, SourceError::OpenFailed))?;
        self.is_open = true;

        let stream: web_sys::ReadableStream = self
            .port
            .readable()
            .dyn_into()
            .map_err(|_| SourceError::OpenFailed("ReadableStream cast failed".into()))?;
        let reader: ReadableStreamDefaultReader = stream
            .get_reader()
            .dyn_into()
            .map_err(|_| SourceError::OpenFailed("Reader cast failed".into()))?;

        self.reader = Some(reader);
        Ok(())
    }

    async fn read(&mut self) -> Result<ReadOutcome, SourceError> {
        let reader = self
            .reader
            .as_ref()
            .ok_or_else(|| SourceError::InvalidState("Port is not open".into()))?;

        // Read is { value: Uint8Array, done: bool }
        let result = JsFuture::from(reader.read())
            .await
            .map_err(|e| classify_js_error(&e, SourceError::Other))?;

        let done = js_sys::Reflect::get(&result, &JsValue::from_str("done"))
            .map_err(|_| SourceError::Other("Invalid read result".into()))?;
        if done.as_bool().unwrap_or(false) {
            return Ok(ReadOutcome::EndOfStream);
        }

        let value = js_sys::Reflect::get(&result, &JsValue::from_str("value"))
            .map_err(|_| SourceError::Other("Invalid read result".into()))?;
        Ok(ReadOutcome::Chunk(Uint8Array::new(&value).to_vec()))
    }

    async fn cancel_read(&mut self) -> Result<(), SourceError> {
        // Resolves any pending read with done = true
        if let Some(reader) = &self.reader {
            JsFuture::from(reader.cancel())
                .await
                .map_err(|e| classify_js_error(&e, SourceError::Other))?;
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        // Port cannot close while its readable stream is locked
        if let Some(reader) = self.reader.take() {
            reader.release_lock();
        }
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;

        JsFuture::from(self.port.close())
            .await
            .map_err(|e| classify_js_error(&e, SourceError::Other))?;
        actor_debug!("Serial port closed");
        Ok(())
    }
}
