#![no_main]

use bridge_core::{
    AxiReadCompletion, AxiResp, AxiWriteCompletion, Bridge, BridgeConfig, MemRequest,
    MemoryResponder, ResponderConfig,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    let config = BridgeConfig {
        max_requests: usize::from(data[0] % 8) + 1,
        data_width: 8 << (data[1] % 5),
        ..BridgeConfig::default()
    };
    let Ok(mut bridge) = Bridge::new(&config) else {
        return;
    };
    let Ok(mut responder) = MemoryResponder::new(&ResponderConfig {
        data_width: config.data_width,
        read_latency: u64::from(data[2] % 8),
        write_latency: u64::from(data[3] % 8),
        window: None,
    }) else {
        return;
    };

    for chunk in data[4..].chunks(4) {
        let [kind, a, b, c] = [0, 1, 2, 3].map(|i| chunk.get(i).copied().unwrap_or(0));
        let addr = u64::from(u16::from_le_bytes([a, b]));
        match kind % 6 {
            0 | 1 => {
                let _ = bridge.cycle(Some(&MemRequest::read(addr)), &mut responder);
            }
            2 | 3 => {
                let request = MemRequest::write(addr, u128::from(c), u16::from(b));
                let _ = bridge.cycle(Some(&request), &mut responder);
            }
            4 => {
                let _ = bridge.cycle(None, &mut responder);
            }
            _ => {
                // Stray completions must latch a violation, never corrupt state.
                let before = bridge.outstanding();
                let result = if c & 1 == 0 {
                    bridge.accept_read_completion(&AxiReadCompletion {
                        id: 0,
                        data: u128::from(a),
                        resp: AxiResp::from_bits(b),
                        last: true,
                    })
                } else {
                    bridge.accept_write_completion(&AxiWriteCompletion {
                        id: 0,
                        resp: AxiResp::from_bits(b),
                    })
                };
                if result.is_err() {
                    assert_eq!(bridge.outstanding(), before);
                    bridge.reset();
                    responder.reset();
                }
            }
        }
        assert!(bridge.outstanding() <= config.max_requests);
    }
});
