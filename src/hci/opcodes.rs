use core::convert::TryFrom;

/// The HCI commands that this library either sends through the stack or matches in a *Command
/// Complete* event.
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum HCICommand {
    LinkControl(LinkControl),
    ControllerAndBaseband(ControllerAndBaseband),
    InformationParameters(InformationParameters),
}

impl HCICommand {
    pub fn as_opcode_pair(&self) -> OpCodePair {
        match *self {
            HCICommand::LinkControl(ref ocf) => ocf.as_opcode_pair(),
            HCICommand::ControllerAndBaseband(ref ocf) => ocf.as_opcode_pair(),
            HCICommand::InformationParameters(ref ocf) => ocf.as_opcode_pair(),
        }
    }

    /// Get the 16 bit OpCode of the command
    pub fn as_opcode(&self) -> u16 {
        self.as_opcode_pair().as_opcode()
    }
}

/// An type for the pair of OGF (OpCode Group Field) and OCF (OpCode Command Field)
#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct OpCodePair {
    pub(crate) ogf: u16,
    pub(crate) ocf: u16,
}

impl OpCodePair {

    /// Get the OpCode Group Field value
    pub fn get_ogf(&self) -> u16 { self.ogf }

    /// Get the OpCode Command Field value
    pub fn get_ocf(&self) -> u16 { self.ocf }

    /// Convert the OpCodePair into the opcode
    ///
    /// The returned value is in native byte order.
    pub fn as_opcode(&self) -> u16 {
        // The first 10 bits of the OpCode is the OCF field and the last 6 bits is the OGF field.
        (self.ocf & 0x3FFu16) | (self.ogf << 10)
    }

    /// Convert a native byte order OpCode into an OpCodePair
    pub fn from_opcode(value: u16) -> Self {
        OpCodePair {
            ogf: value >> 10,
            ocf: value & 0x3FFu16,
        }
    }
}

impl TryFrom<OpCodePair> for HCICommand {
    type Error = &'static str;

    fn try_from(opc_pair: OpCodePair) -> Result<Self, Self::Error> {
        match opc_pair.ogf {
            0x1 => Ok(HCICommand::LinkControl( LinkControl::try_from(opc_pair.ocf)? )),
            0x3 => Ok(HCICommand::ControllerAndBaseband( ControllerAndBaseband::try_from(opc_pair.ocf)? )),
            0x4 => Ok(HCICommand::InformationParameters( InformationParameters::try_from(opc_pair.ocf)? )),
            _ => Err("Unknown OpCode Group Field value"),
        }
    }
}

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum LinkControl {
    LinkKeyRequestNegativeReply,
    PINCodeRequestReply,
}

impl LinkControl {
    const OGF: u16 = 0x1;

    #[inline]
    fn as_opcode_pair(&self) -> OpCodePair {
        use self::LinkControl::*;

        OpCodePair {
            ogf: LinkControl::OGF,
            ocf: match *self {
                LinkKeyRequestNegativeReply => 0xc,
                PINCodeRequestReply => 0xd,
            }
        }
    }

    fn try_from(ocf: u16) -> Result< Self, &'static str> {
        match ocf {
            0xc => Ok(LinkControl::LinkKeyRequestNegativeReply),
            0xd => Ok(LinkControl::PINCodeRequestReply),
            _ => Err("OpCode Group Field 'Link Control' doesn't have this Op Code Field"),
        }
    }
}

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum ControllerAndBaseband {
    WriteLocalName,
    WriteScanEnable,
}

impl ControllerAndBaseband {
    const OGF: u16 = 0x3;

    #[inline]
    fn as_opcode_pair(&self) -> OpCodePair {
        use self::ControllerAndBaseband::*;

        OpCodePair {
            ogf: ControllerAndBaseband::OGF,
            ocf: match *self {
                WriteLocalName => 0x13,
                WriteScanEnable => 0x1a,
            }
        }
    }

    fn try_from(ocf: u16) -> Result< Self, &'static str> {
        match ocf {
            0x13 => Ok(ControllerAndBaseband::WriteLocalName),
            0x1a => Ok(ControllerAndBaseband::WriteScanEnable),
            _ => Err("OpCode Group Field 'Controller and Baseband' doesn't have this Op Code Field"),
        }
    }
}

#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub enum InformationParameters {
    #[allow(non_camel_case_types)] ReadBD_ADDR,
}

impl InformationParameters {
    const OGF: u16 = 0x4;

    #[inline]
    fn as_opcode_pair(&self) -> OpCodePair {
        use self::InformationParameters::*;

        OpCodePair {
            ogf: InformationParameters::OGF,
            ocf: match *self {
                ReadBD_ADDR => 0x9,
            }
        }
    }

    fn try_from(ocf: u16) -> Result< Self, &'static str> {
        match ocf {
            0x9 => Ok(InformationParameters::ReadBD_ADDR),
            _ => Err("OpCode Group Field 'Information Parameters' doesn't have this Op Code Field"),
        }
    }
}
