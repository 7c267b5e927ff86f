//! Built-in DSP component kinds and their factories.

use super::audio::{AudioComponent, ComponentDescription};
use super::port::{AudioEncoding, PortTemplate};
use super::{AppData, ComponentCallbacks, ComponentHandle};
use crate::error::Result;
use crate::session::Session;
use std::sync::Arc;

// One stereo frame of decoded audio per buffer, S16 interleaved.
const AAC_FRAME_BYTES: u32 = 1024 * 2 * 2;
const MP3_FRAME_BYTES: u32 = 1152 * 2 * 2;
const PCM_PERIOD_BYTES: u32 = 4096;
// Eight TDM slots of 16-bit samples.
const TDM_PERIOD_BYTES: u32 = PCM_PERIOD_BYTES * 4;

/// AAC decoder.
pub static AAC_DECODER: ComponentDescription = ComponentDescription {
    name: "OMX.xa.aac.decoder",
    role: "audio_decoder.aac",
    ports: &[
        PortTemplate::input(AudioEncoding::Aac, 2, 4096),
        PortTemplate::output(AudioEncoding::Pcm, 4, AAC_FRAME_BYTES),
    ],
};

/// MP3 decoder.
pub static MP3_DECODER: ComponentDescription = ComponentDescription {
    name: "OMX.xa.mp3.decoder",
    role: "audio_decoder.mp3",
    ports: &[
        PortTemplate::input(AudioEncoding::Mp3, 2, 4096),
        PortTemplate::output(AudioEncoding::Pcm, 4, MP3_FRAME_BYTES),
    ],
};

/// AAC encoder.
pub static AAC_ENCODER: ComponentDescription = ComponentDescription {
    name: "OMX.xa.aac.encoder",
    role: "audio_encoder.aac",
    ports: &[
        PortTemplate::input(AudioEncoding::Pcm, 4, AAC_FRAME_BYTES),
        PortTemplate::output(AudioEncoding::Aac, 2, 1536),
    ],
};

/// Vorbis decoder.
pub static VORBIS_DECODER: ComponentDescription = ComponentDescription {
    name: "OMX.xa.vorbis.decoder",
    role: "audio_decoder.vorbis",
    ports: &[
        PortTemplate::input(AudioEncoding::Vorbis, 2, 8192),
        PortTemplate::output(AudioEncoding::Pcm, 4, PCM_PERIOD_BYTES),
    ],
};

/// PCM renderer.
pub static RENDERER: ComponentDescription = ComponentDescription {
    name: "OMX.RENESAS.AUDIO.DSP.RENDERER",
    role: "audio_renderer.pcm",
    ports: &[PortTemplate::input(AudioEncoding::Pcm, 2, PCM_PERIOD_BYTES)],
};

/// PCM capturer.
pub static CAPTURE: ComponentDescription = ComponentDescription {
    name: "OMX.RENESAS.AUDIO.DSP.CAPTURE",
    role: "audio_capture.pcm",
    ports: &[PortTemplate::output(AudioEncoding::Pcm, 2, PCM_PERIOD_BYTES).read_only()],
};

/// PCM equalizer.
pub static EQUALIZER: ComponentDescription = ComponentDescription {
    name: "OMX.RENESAS.AUDIO.DSP.EQUALIZER",
    role: "audio_processor.pcm.equalizer",
    ports: &[
        PortTemplate::input(AudioEncoding::Pcm, 2, PCM_PERIOD_BYTES),
        PortTemplate::output(AudioEncoding::Pcm, 2, PCM_PERIOD_BYTES),
    ],
};

/// Multichannel TDM renderer.
pub static TDM_RENDERER: ComponentDescription = ComponentDescription {
    name: "OMX.RENESAS.AUDIO.DSP.TDMRENDERER",
    role: "audio_tdm_renderer.pcm",
    ports: &[PortTemplate::input(AudioEncoding::Pcm, 2, TDM_PERIOD_BYTES)],
};

/// Multichannel TDM capturer.
pub static TDM_CAPTURE: ComponentDescription = ComponentDescription {
    name: "OMX.RENESAS.AUDIO.DSP.TDMCAPTURE",
    role: "audio_tdm_capture.pcm",
    ports: &[PortTemplate::output(AudioEncoding::Pcm, 2, TDM_PERIOD_BYTES).read_only()],
};

macro_rules! factory {
    ($(#[$doc:meta])* $fn_name:ident => $desc:ident) => {
        $(#[$doc])*
        pub fn $fn_name(
            session: &Session,
            app_data: AppData,
            callbacks: Arc<dyn ComponentCallbacks>,
        ) -> Result<ComponentHandle> {
            AudioComponent::create(&$desc, session, app_data, callbacks)
        }
    };
}

factory!(
    /// Create an AAC decoder.
    create_aac_decoder => AAC_DECODER
);
factory!(
    /// Create an MP3 decoder.
    create_mp3_decoder => MP3_DECODER
);
factory!(
    /// Create an AAC encoder.
    create_aac_encoder => AAC_ENCODER
);
factory!(
    /// Create a Vorbis decoder.
    create_vorbis_decoder => VORBIS_DECODER
);
factory!(
    /// Create a PCM renderer.
    create_renderer => RENDERER
);
factory!(
    /// Create a PCM capturer.
    create_capture => CAPTURE
);
factory!(
    /// Create a PCM equalizer.
    create_equalizer => EQUALIZER
);
factory!(
    /// Create a TDM renderer.
    create_tdm_renderer => TDM_RENDERER
);
factory!(
    /// Create a TDM capturer.
    create_tdm_capture => TDM_CAPTURE
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{NoCallbacks, PortDirection};

    #[test]
    fn test_port_layouts() {
        for desc in [&AAC_DECODER, &MP3_DECODER, &AAC_ENCODER, &VORBIS_DECODER, &EQUALIZER] {
            assert_eq!(desc.ports.len(), 2, "{}", desc.name);
            assert_eq!(desc.ports[0].direction, PortDirection::Input);
            assert_eq!(desc.ports[1].direction, PortDirection::Output);
        }
        for desc in [&RENDERER, &TDM_RENDERER] {
            assert_eq!(desc.ports.len(), 1);
            assert_eq!(desc.ports[0].direction, PortDirection::Input);
        }
        for desc in [&CAPTURE, &TDM_CAPTURE] {
            assert_eq!(desc.ports.len(), 1);
            assert_eq!(desc.ports[0].direction, PortDirection::Output);
            assert!(desc.ports[0].read_only);
        }
    }

    #[test]
    fn test_decoder_output_feeds_renderer() {
        let decoded = MP3_DECODER.ports[1].definition(1);
        let rendered = RENDERER.ports[0].definition(0);
        assert!(rendered.accepts(&decoded));
    }

    #[test]
    fn test_factory_binds_description() {
        use crate::proxy::LocalProxy;
        use crate::session::SessionManager;

        let mut manager = SessionManager::new(Arc::new(LocalProxy::new()));
        manager.open_session().unwrap();
        let session = manager.session().unwrap();

        let handle = create_equalizer(&session, None, Arc::new(NoCallbacks)).unwrap();
        assert_eq!(handle.name(), "OMX.RENESAS.AUDIO.DSP.EQUALIZER");
        assert_eq!(handle.role(), Some("audio_processor.pcm.equalizer"));
        assert_eq!(session.aux_pool().available(), 15);
    }
}
