//! Attach lifecycle
//!
//! The stack is brought up the first time the controller is seen attached and is then given a
//! tick every pass. When the controller goes away nothing is torn down, the stack is left alone
//! until the next attach brings it up again from scratch.

use super::{AttachState, DevicePresence, EventAdapter, Session, SppConnection};
use crate::hci::{HciConfig, HostControllerInterface, Protocol};
use crate::rfcomm::RfcommInterface;
use crate::sdp::{ServiceDiscoveryInterface, SppServiceRecord};
use core::fmt::Display;

/// The steps of bringing up the stack, in order
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum BringUpStep {
    InitTransport,
    InitHci,
    DisableSecureSimplePairing,
    RegisterL2capHandler,
    InitRfcomm,
    RegisterRfcommHandler,
    RegisterRfcommService,
    InitSdp,
    RegisterServiceRecord,
    PowerOn,
}

impl Display for BringUpStep {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let step = match self {
            BringUpStep::InitTransport => "initializing the transport",
            BringUpStep::InitHci => "initializing HCI",
            BringUpStep::DisableSecureSimplePairing => "setting secure simple pairing",
            BringUpStep::RegisterL2capHandler => "registering the L2CAP packet handler",
            BringUpStep::InitRfcomm => "initializing RFCOMM",
            BringUpStep::RegisterRfcommHandler => "registering the RFCOMM packet handler",
            BringUpStep::RegisterRfcommService => "registering the RFCOMM service",
            BringUpStep::InitSdp => "initializing SDP",
            BringUpStep::RegisterServiceRecord => "registering the SPP service record",
            BringUpStep::PowerOn => "powering on",
        };

        write!(f, "{}", step)
    }
}

/// Error from bringing up the stack
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct BringUpError<E> {
    pub step: BringUpStep,
    pub error: E,
}

impl<E> Display for BringUpError<E> where E: Display {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Bluetooth bring-up failed when {}: {}", self.step, self.error)
    }
}

fn at<E>(step: BringUpStep) -> impl FnOnce(E) -> BringUpError<E> {
    move |error| BringUpError { step, error }
}

impl<'b, S, P, C> SppConnection<'b, S, P, C>
where S: RfcommInterface + ServiceDiscoveryInterface,
      P: DevicePresence,
{
    /// Run one pass of the connection
    ///
    /// This must be called continuously by the firmware's main loop. All callbacks to the
    /// application are made from within this method (or from within
    /// [`handle_packet`](SppConnection::handle_packet)).
    pub fn tick(&mut self) {
        let attached = self.presence.is_device_attached();

        match (self.state, attached) {
            (AttachState::Detached, true) => {
                match self.bring_up() {
                    Ok(()) => {
                        log::info!("Bluetooth attached.");

                        self.state = AttachState::Attached;
                    },
                    Err(e) => log::error!("{}", e),
                }
            },

            (AttachState::Attached, true) => {
                let mut adapter = EventAdapter::new(&mut self.session, &self.config);

                self.stack.transport_tasks(&mut *self.buffer, &mut adapter);

                self.session.grant_owed_credit(&mut self.stack);
            },

            (AttachState::Attached, false) => {
                log::info!("Bluetooth detached.");

                self.session.detach();

                self.state = AttachState::Detached;
            },

            (AttachState::Detached, false) => (),
        }
    }

    /// Initialize every layer of the stack and publish the serial port service
    fn bring_up(&mut self) -> Result<(), BringUpError<<S as HostControllerInterface>::Error>> {
        self.session = Session::new();

        let channel = self.config.rfcomm_channel;

        let transport = self.stack.init_transport(&mut *self.buffer)
            .map_err(at(BringUpStep::InitTransport))?;

        self.stack.init(transport, &HciConfig::default())
            .map_err(at(BringUpStep::InitHci))?;

        self.stack.set_secure_simple_pairing(self.config.secure_simple_pairing)
            .map_err(at(BringUpStep::DisableSecureSimplePairing))?;

        self.stack.register_packet_handler(Protocol::L2cap)
            .map_err(at(BringUpStep::RegisterL2capHandler))?;

        self.stack.init_rfcomm()
            .map_err(at(BringUpStep::InitRfcomm))?;

        self.stack.register_packet_handler(Protocol::Rfcomm)
            .map_err(at(BringUpStep::RegisterRfcommHandler))?;

        self.stack.register_service(channel, self.config.rfcomm_mtu)
            .map_err(at(BringUpStep::RegisterRfcommService))?;

        self.stack.init_sdp()
            .map_err(at(BringUpStep::InitSdp))?;

        self.stack.register_service_record(&SppServiceRecord::new(channel))
            .map_err(at(BringUpStep::RegisterServiceRecord))?;

        self.stack.power_on()
            .map_err(at(BringUpStep::PowerOn))?;

        Ok(())
    }
}
